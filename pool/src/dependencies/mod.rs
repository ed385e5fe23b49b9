mod access_control;
pub use access_control::AccessControlClient;

mod fee_reduction;
pub use fee_reduction::FeeReductionProviderClient;

mod flash_loan_receiver;
pub use flash_loan_receiver::FlashLoanReceiverClient;

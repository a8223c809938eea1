pub mod issue;
pub mod resend;
pub mod verify;

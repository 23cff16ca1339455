pub mod create;
pub mod init;
pub mod resolve;
pub mod run;
pub mod status;

pub mod accounts;
pub mod form;
pub mod init;
pub mod maintenance;
pub mod misc;
pub mod statements;

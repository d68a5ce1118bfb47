pub mod attempt;
pub mod multiplayer;
pub mod question;
pub mod report;
pub mod session;

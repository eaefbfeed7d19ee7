pub mod check;
pub mod grant;
pub mod local;
pub mod refresh;
pub mod run;
pub mod status;

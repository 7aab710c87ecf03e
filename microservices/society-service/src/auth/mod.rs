mod service;

pub use service::AuthService;

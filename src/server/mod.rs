pub mod myresponse;
pub mod nonce;
pub mod server;

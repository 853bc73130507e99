pub mod cache;
pub mod fallback;
pub mod formats;
pub mod html;
pub mod http_client;
pub mod pipeline;
pub mod registry;
pub mod retry;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

//! filedrop - a small file sharing server
//!
//! HTTP/1.0 over raw sockets: hand-written request parsing, single-file
//! multipart uploads sized by `Content-Length`, and a quota-capped upload
//! directory behind a login form.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
pub mod storage;
pub mod templates;

//! Routes one parsed request to its endpoint.
//!
//! Every endpoint produces exactly one [`Response`]. Errors are turned into
//! rendered error pages here, so the connection only ever sees responses.
//! Each route leaves the stream positioned after the declared body: it either
//! consumes the body or drains it before answering.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncWriteExt};

use crate::error::ServerError;
use crate::http::body::{self, form_field, read_form_body};
use crate::http::mime::content_type_for;
use crate::http::multipart::{MultipartError, MultipartUpload};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::server::AppContext;
use crate::templates::{
    ERROR_PAGE, FILE_LIST_PAGE, HOME_PAGE, LOGIN_PAGE, UPLOAD_SUCCESS_PAGE, error_fragment,
    escape_html, file_list_items,
};

const FILES_PREFIX: &str = "/files/";

pub async fn dispatch<R>(ctx: &AppContext, req: &Request, reader: &mut R) -> Response
where
    R: AsyncBufRead + Unpin,
{
    let path = req.path.as_str();

    let result = match req.method {
        Method::GET => get(ctx, req, reader).await,
        Method::POST if path.starts_with("/home") => login(ctx, req, reader).await,
        Method::POST if path.starts_with("/upload") => upload(ctx, req, reader).await,
        Method::POST if path.starts_with("/list") => list(ctx, req, reader).await,
        Method::POST if path.starts_with("/delete") => delete(ctx, req, reader).await,
        Method::POST => drain(req, reader)
            .await
            .and_then(|_| Err(ServerError::NotFound(req.path.clone()))),
        other => drain(req, reader)
            .await
            .and_then(|_| Err(ServerError::MethodNotAllowed(other.as_str()))),
    };

    match result {
        Ok(response) => {
            tracing::debug!(
                method = req.method.as_str(),
                path = %req.path,
                status = response.status.as_u16(),
                "Request handled"
            );
            response
        }
        Err(e) => error_response(ctx, &e).await,
    }
}

/// Renders the page for a failed request.
pub async fn error_response(ctx: &AppContext, err: &ServerError) -> Response {
    let status = err.status();
    if status == StatusCode::InternalServerError {
        tracing::error!(status = status.as_u16(), error = %err, "Request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %err, "Request rejected");
    }

    if let ServerError::AuthFailure = err {
        return login_page(ctx, status, &error_fragment(&err.to_string())).await;
    }

    let message = escape_html(&err.to_string());
    let page = ctx
        .templates
        .render(ERROR_PAGE, &[("error_message", message.as_str())])
        .await;
    Response::html(status, page)
}

async fn drain<R>(req: &Request, reader: &mut R) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
{
    if req.body_len() > 0 {
        body::discard(reader, req.body_len() as u64).await?;
    }
    Ok(())
}

async fn get<R>(ctx: &AppContext, req: &Request, reader: &mut R) -> Result<Response, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    drain(req, reader).await?;

    match req.path.as_str() {
        "/" | "/index.html" => Ok(login_page(ctx, StatusCode::Ok, "").await),
        "/home.html" => home_page(ctx).await,
        path => match path.strip_prefix(FILES_PREFIX) {
            Some(name) => {
                let (file, len) = ctx.storage.open(name).await?;
                Ok(Response::file(StatusCode::Ok, content_type_for(name), file, len))
            }
            None => static_file(&ctx.config.web_root, path).await,
        },
    }
}

async fn static_file(web_root: &Path, path: &str) -> Result<Response, ServerError> {
    let not_found = || ServerError::NotFound(path.to_string());
    let full = web_path(web_root, path).ok_or_else(not_found)?;

    let file = tokio::fs::File::open(&full).await.map_err(|_| not_found())?;
    let meta = file.metadata().await?;
    if !meta.is_file() {
        return Err(not_found());
    }

    Ok(Response::file(
        StatusCode::Ok,
        content_type_for(&full),
        file,
        meta.len(),
    ))
}

/// Joins a request path onto the web root, refusing anything that could
/// climb out of it.
pub fn web_path(web_root: &Path, path: &str) -> Option<PathBuf> {
    let mut full = web_root.to_path_buf();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains(['\\', '\0']) {
            return None;
        }
        full.push(segment);
    }
    Some(full)
}

async fn login<R>(ctx: &AppContext, req: &Request, reader: &mut R) -> Result<Response, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    let form = read_form(req, reader).await?;
    let username = form_field(&form, "username").unwrap_or_default();
    let password = form_field(&form, "password").unwrap_or_default();

    if !ctx.config.credentials.matches(&username, &password) {
        return Err(ServerError::AuthFailure);
    }

    tracing::info!(user = %username, "Login accepted");
    home_page(ctx).await
}

async fn upload<R>(ctx: &AppContext, req: &Request, reader: &mut R) -> Result<Response, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    let content_length = req
        .content_length
        .filter(|len| *len > 0)
        .ok_or_else(|| ServerError::Protocol("Content-Length: expected and not found".into()))?;

    let Some(boundary) = req.boundary() else {
        body::discard(reader, content_length as u64).await?;
        return Err(ServerError::Protocol(
            "Content-Type: multipart/form-data; expected and not found".into(),
        ));
    };

    // Rejected uploads are drained before answering.
    let slot = match ctx.storage.reserve_slot().await {
        Ok(slot) => slot,
        Err(e) => {
            body::discard(reader, content_length as u64).await?;
            return Err(e);
        }
    };

    let mut upload = MultipartUpload::new(reader, content_length, boundary);

    let head = upload.read_part_head().await;
    let head = match head {
        Ok(head) => head,
        Err(e) => {
            upload.discard_rest().await?;
            return Err(e.into());
        }
    };

    let Some(filename) = head.filename else {
        upload.discard_rest().await?;
        return Err(MultipartError::MissingFilename.into());
    };

    let dest = match ctx.storage.resolve(&filename) {
        Ok(dest) => dest,
        Err(e) => {
            upload.discard_rest().await?;
            return Err(e);
        }
    };

    if let Err(e) = upload.payload_len() {
        upload.discard_rest().await?;
        return Err(e.into());
    }

    // A stored file is only ever replaced by a completed upload.
    let staging = ctx.storage.staging_path();
    let mut file = match tokio::fs::File::create(&staging).await {
        Ok(file) => file,
        Err(e) => {
            upload.discard_rest().await?;
            return Err(e.into());
        }
    };
    let written = write_payload(&mut upload, &mut file).await;
    drop(file);
    let written = match written {
        Ok(written) => written,
        Err(e) => {
            remove_staging(&staging).await;
            upload.discard_rest().await?;
            return Err(e);
        }
    };
    if let Err(e) = tokio::fs::rename(&staging, &dest).await {
        remove_staging(&staging).await;
        return Err(e.into());
    }
    drop(slot);

    tracing::info!(file = %filename, bytes = written, "Upload stored");

    let shown = escape_html(&filename);
    let page = ctx
        .templates
        .render(UPLOAD_SUCCESS_PAGE, &[("file_name", shown.as_str())])
        .await;
    Ok(Response::html(StatusCode::Ok, page))
}

async fn write_payload<R>(
    upload: &mut MultipartUpload<'_, R>,
    file: &mut tokio::fs::File,
) -> Result<u64, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    let written = upload.copy_payload_to(file).await?;
    file.flush().await?;
    Ok(written)
}

async fn remove_staging(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(file = %path.display(), error = %e, "Failed to remove partial upload");
    }
}

async fn list<R>(ctx: &AppContext, req: &Request, reader: &mut R) -> Result<Response, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    drain(req, reader).await?;
    file_list_page(ctx).await
}

async fn delete<R>(ctx: &AppContext, req: &Request, reader: &mut R) -> Result<Response, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    let form = read_form(req, reader).await?;
    let name = form_field(&form, "filename")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ServerError::Protocol("filename expected and not found".into()))?;

    ctx.storage.delete(&name).await?;
    tracing::info!(file = %name, "File deleted");

    file_list_page(ctx).await
}

async fn read_form<R>(req: &Request, reader: &mut R) -> Result<Vec<u8>, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    read_form_body(reader, req.body_len())
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => ServerError::Protocol(e.to_string()),
            io::ErrorKind::UnexpectedEof => {
                ServerError::Protocol("form body shorter than Content-Length".into())
            }
            _ => ServerError::Io(e),
        })
}

async fn login_page(ctx: &AppContext, status: StatusCode, error: &str) -> Response {
    let page = ctx
        .templates
        .render(LOGIN_PAGE, &[("error_message", error)])
        .await;
    Response::html(status, page)
}

async fn home_page(ctx: &AppContext) -> Result<Response, ServerError> {
    let files = ctx.storage.list().await?;
    let items = file_list_items(&files);
    let count = files.len().to_string();
    let max = ctx.storage.max_files().to_string();

    let page = ctx
        .templates
        .render(
            HOME_PAGE,
            &[
                ("file_list_items", items.as_str()),
                ("file_count", count.as_str()),
                ("max_files", max.as_str()),
            ],
        )
        .await;
    Ok(Response::html(StatusCode::Ok, page))
}

async fn file_list_page(ctx: &AppContext) -> Result<Response, ServerError> {
    let items = file_list_items(&ctx.storage.list().await?);
    let page = ctx
        .templates
        .render(FILE_LIST_PAGE, &[("file_list_items", items.as_str())])
        .await;
    Ok(Response::html(StatusCode::Ok, page))
}

//! Content-type dispatch: per request, decide which decode pipeline feeds the
//! destination record.
//!
//! Form submissions (url-encoded and multipart) and route parameters go
//! through a [`ValueSource`] and the [`Bind`] field walk; structured bodies
//! (JSON, XML, YAML, TOML) are handed wholesale to the matching serde
//! deserializer. Pipelines can run in sequence against the same destination:
//! a [`ValueSource`]-backed pass only touches the keys it resolves, so
//! sequencing is a controlled partial overwrite.
use http::Method;
use mime::Mime;
use serde::de::DeserializeOwned;

use super::errors::{BindError, BindRequestError, BodyDecodeError, BodyFormat, MultipartError};
use super::multipart::{parse_multipart, MultipartLimits};
use super::{Bind, Namespace, ValueSource};
use crate::request::body::BufferedBody;
use crate::request::RequestHead;

/// The decode pipeline selected for a request.
#[derive(Debug)]
enum Pipeline {
    /// Url-encoded body merged with the query string.
    UrlEncoded,
    /// Multipart body with the given boundary, merged with the query string.
    Multipart(String),
    /// A structured body handed to a serde deserializer.
    Structured(BodyFormat),
    /// No recognized body format: only the query string contributes scalars.
    QueryOnly,
}

fn content_type(head: &RequestHead) -> Option<Mime> {
    head.headers
        .get(http::header::CONTENT_TYPE)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn classify(mime: Option<&Mime>) -> Result<Pipeline, MultipartError> {
    let Some(mime) = mime else {
        return Ok(Pipeline::QueryOnly);
    };
    let pipeline = if mime.type_() == mime::APPLICATION
        && mime.subtype() == mime::WWW_FORM_URLENCODED
    {
        Pipeline::UrlEncoded
    } else if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        let boundary = mime
            .get_param(mime::BOUNDARY)
            .ok_or(MultipartError::MissingBoundary)?;
        Pipeline::Multipart(boundary.as_str().to_owned())
    } else if mime.type_() == mime::APPLICATION
        && (mime.subtype() == mime::JSON || mime.suffix().is_some_and(|s| s == mime::JSON))
    {
        Pipeline::Structured(BodyFormat::Json)
    } else if (mime.type_() == mime::APPLICATION || mime.type_() == mime::TEXT)
        && mime.subtype() == mime::XML
    {
        Pipeline::Structured(BodyFormat::Xml)
    } else if mime.type_() == mime::APPLICATION
        && (mime.subtype() == "yaml" || mime.subtype() == "x-yaml")
    {
        Pipeline::Structured(BodyFormat::Yaml)
    } else if mime.type_() == mime::APPLICATION && mime.subtype() == "toml" {
        Pipeline::Structured(BodyFormat::Toml)
    } else {
        Pipeline::QueryOnly
    };
    Ok(pipeline)
}

/// The structured body format named by the request's `Content-Type` header,
/// if it names one the dispatcher can decode.
pub fn body_format(head: &RequestHead) -> Option<BodyFormat> {
    match classify(content_type(head).as_ref()) {
        Ok(Pipeline::Structured(format)) => Some(format),
        _ => None,
    }
}

/// Build the [`ValueSource`] for a request: query-string pairs, merged with
/// the url-encoded body or the parsed multipart body when the content type
/// carries one.
///
/// Body scalars are only read for `POST`, `PUT` and `PATCH` requests; other
/// methods contribute query-string pairs alone.
pub async fn form_source(
    head: &RequestHead,
    body: &BufferedBody,
    limits: MultipartLimits,
) -> Result<ValueSource, BindRequestError> {
    let mut source = ValueSource::new();
    if let Some(query) = head.target.query() {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            source.push_scalar(key.into_owned(), value.into_owned());
        }
    }

    let has_body = matches!(head.method, Method::POST | Method::PUT | Method::PATCH);
    if has_body {
        match classify(content_type(head).as_ref())? {
            Pipeline::UrlEncoded => {
                tracing::debug!("binding request data from the url-encoded body");
                for (key, value) in form_urlencoded::parse(&body.bytes) {
                    source.push_scalar(key.into_owned(), value.into_owned());
                }
            }
            Pipeline::Multipart(boundary) => {
                tracing::debug!("binding request data from the multipart body");
                parse_multipart(body, &boundary, limits, &mut source).await?;
            }
            Pipeline::Structured(_) | Pipeline::QueryOnly => {}
        }
    }
    Ok(source)
}

/// Bind the request's form data (query string, url-encoded body or multipart
/// body) into `dest` under the `form` namespace.
pub async fn bind_form<T: Bind>(
    head: &RequestHead,
    body: &BufferedBody,
    dest: &mut T,
) -> Result<(), BindRequestError> {
    let source = form_source(head, body, MultipartLimits::default()).await?;
    dest.bind(&source, Namespace::Form)?;
    Ok(())
}

/// Bind already-extracted route parameters into `dest` under the `param`
/// namespace: one synthetic scalar per placeholder.
pub fn bind_params<'a, T: Bind>(
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
    dest: &mut T,
) -> Result<(), BindError> {
    let source = ValueSource::from_route_params(params);
    dest.bind(&source, Namespace::Param)
}

/// Decode the whole buffered body as `format` into a fresh `T`.
pub fn decode_body<T: DeserializeOwned>(
    format: BodyFormat,
    body: &BufferedBody,
) -> Result<T, BodyDecodeError> {
    let decode_err = |source: Box<dyn std::error::Error + Send + Sync>| BodyDecodeError {
        format,
        source,
    };
    match format {
        BodyFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_slice(&body.bytes);
            serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|e| decode_err(Box::new(e)))
        }
        BodyFormat::Xml => {
            quick_xml::de::from_reader(body.bytes.as_ref()).map_err(|e| decode_err(Box::new(e)))
        }
        BodyFormat::Yaml => {
            serde_yaml::from_slice(&body.bytes).map_err(|e| decode_err(Box::new(e)))
        }
        BodyFormat::Toml => {
            let text = std::str::from_utf8(&body.bytes).map_err(|e| decode_err(Box::new(e)))?;
            toml::from_str(text).map_err(|e| decode_err(Box::new(e)))
        }
    }
}

/// Bind a request into `dest`, selecting the pipeline from its content type.
///
/// When the content type names a structured format, the body replaces `dest`
/// wholesale first; the form pass (query string, and the form-encoded body
/// where there is one) then overlays the keys it resolves. Run
/// [`bind_params`] separately, before or after, to layer in route
/// parameters.
pub async fn bind<T>(
    head: &RequestHead,
    body: &BufferedBody,
    dest: &mut T,
) -> Result<(), BindRequestError>
where
    T: Bind + DeserializeOwned,
{
    if let Some(format) = body_format(head) {
        tracing::debug!(format = %format, "decoding the request body as a structured document");
        *dest = decode_body(format, body)?;
    }
    bind_form(head, body, dest).await
}

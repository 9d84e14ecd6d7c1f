//! The admin "new post" flow: three images arrive as base64 data URLs inside a
//! JSON body, get written to the asset directory, and are referenced by the
//! new post row.
//!
//! Files are staged before the insert and renamed into place inside the
//! insert's transaction. Any failure, or the request being dropped, removes
//! every file written so far and rolls the row back.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::assets::{AssetDir, StagedFile, validate_file_name};
use crate::error::{BlogError, BlogResult};
use crate::store::{NewPost, PostStore};

const MIB: usize = 1024 * 1024;
pub const AUTHOR_PHOTO_LIMIT: usize = 5 * MIB;
pub const BIG_IMAGE_LIMIT: usize = 10 * MIB;
pub const SMALL_IMAGE_LIMIT: usize = 5 * MIB;

/// Body of `POST /post`, keyed the way the admin page sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub theme: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(rename = "authorname", default)]
    pub author_name: String,
    #[serde(rename = "authorphoto")]
    pub author_photo: String,
    #[serde(rename = "authorphotoname")]
    pub author_photo_name: String,
    #[serde(rename = "data", default)]
    pub publish_date: String,
    #[serde(rename = "bigimage")]
    pub big_image: String,
    #[serde(rename = "bigimagename")]
    pub big_image_name: String,
    #[serde(rename = "smallimage")]
    pub small_image: String,
    #[serde(rename = "smallimagename")]
    pub small_image_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decodes `data:<type>;base64,<payload>`. Everything up to the first comma
/// is the header; a string without a comma is taken as bare base64.
pub fn decode_data_url(input: &str) -> BlogResult<DataUrl> {
    let (header, payload) = match input.split_once(',') {
        Some((header, payload)) => (Some(header), payload),
        None => (None, input),
    };

    let media_type = header
        .and_then(|h| h.trim().strip_prefix("data:"))
        .and_then(|h| h.split(';').next())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| BlogError::validation(format!("image is not valid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(BlogError::validation("image is empty"));
    }

    Ok(DataUrl { media_type, bytes })
}

struct ImageField<'a> {
    what: &'static str,
    data: &'a str,
    client_name: &'a str,
    limit: usize,
}

struct DecodedImage {
    kind: ImageKind,
    bytes: Vec<u8>,
}

impl ImageField<'_> {
    fn decode(&self) -> BlogResult<DecodedImage> {
        // The client's name is never used on disk, but a name carrying a path
        // is a malformed request all the same.
        let labelled = |err: BlogError| match err {
            BlogError::Validation(msg) => BlogError::Validation(format!("{}: {msg}", self.what)),
            other => other,
        };

        validate_file_name(self.client_name).map_err(labelled)?;
        let url = decode_data_url(self.data).map_err(labelled)?;

        if url.bytes.len() > self.limit {
            return Err(BlogError::TooLarge {
                what: self.what,
                limit: self.limit,
            });
        }

        // A declared media type is authoritative; the client's extension only
        // stands in for a bare base64 payload.
        let kind = match url.media_type.as_deref() {
            Some(media_type) => ImageKind::from_media_type(media_type),
            None => ImageKind::from_file_name(self.client_name),
        }
        .ok_or_else(|| {
            BlogError::validation(format!("{}: only png, jpeg and gif are accepted", self.what))
        })?;

        Ok(DecodedImage {
            kind,
            bytes: url.bytes,
        })
    }
}

#[derive(Clone)]
pub struct Uploader {
    posts: PostStore,
    assets: AssetDir,
}

impl Uploader {
    pub fn new(posts: PostStore, assets: AssetDir) -> Self {
        Self { posts, assets }
    }

    pub fn assets(&self) -> &AssetDir {
        &self.assets
    }

    /// Runs the whole flow and returns the new post's id.
    pub async fn create_post(&self, req: &CreatePostRequest) -> BlogResult<i64> {
        if req.title.trim().is_empty() {
            return Err(BlogError::validation("title is required"));
        }

        let fields = [
            ImageField {
                what: "author photo",
                data: &req.author_photo,
                client_name: &req.author_photo_name,
                limit: AUTHOR_PHOTO_LIMIT,
            },
            ImageField {
                what: "big hero image",
                data: &req.big_image,
                client_name: &req.big_image_name,
                limit: BIG_IMAGE_LIMIT,
            },
            ImageField {
                what: "small hero image",
                data: &req.small_image,
                client_name: &req.small_image_name,
                limit: SMALL_IMAGE_LIMIT,
            },
        ];

        let decoded = fields
            .iter()
            .map(|field| field.decode())
            .collect::<BlogResult<Vec<_>>>()?;

        self.assets.ensure().await?;

        // Dropping a staged file removes it, so every early return below and
        // a cancelled request both clean up after themselves.
        let mut staged = Vec::with_capacity(decoded.len());
        for image in &decoded {
            staged.push(self.assets.stage(&image.bytes, image.kind.extension()).await?);
        }

        match self.persist(req, staged).await {
            Ok(id) => {
                tracing::info!(id, title = %req.title, "created post");
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "create post failed, uploaded images removed");
                Err(e)
            }
        }
    }

    async fn persist(&self, req: &CreatePostRequest, mut staged: Vec<StagedFile>) -> BlogResult<i64> {
        let [author, big, small] = staged.as_slice() else {
            return Err(BlogError::validation("expected three images"));
        };

        let new_post = NewPost {
            theme: req.theme.trim().to_string(),
            title: req.title.trim().to_string(),
            subtitle: req.subtitle.clone(),
            author: req.author_name.trim().to_string(),
            author_image: author.key().to_string(),
            publish_date: req.publish_date.trim().to_string(),
            hero_image: big.key().to_string(),
            hero_image_small: small.key().to_string(),
            content: req.content.clone(),
            featured: req.featured,
        };

        let mut tx = self.posts.begin().await?;
        let id = self.posts.insert(&mut tx, &new_post).await?;
        for file in staged.iter_mut() {
            file.commit().await?;
        }
        tx.commit().await?;

        for file in staged {
            file.keep();
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_url() {
        let url = decode_data_url("data:image/png;base64,QQ==").unwrap();
        assert_eq!(url.media_type.as_deref(), Some("image/png"));
        assert_eq!(url.bytes, b"A");
    }

    #[test]
    fn bare_base64_is_accepted() {
        let url = decode_data_url("Qg==").unwrap();
        assert_eq!(url.media_type, None);
        assert_eq!(url.bytes, b"B");
    }

    #[test]
    fn bad_payloads_are_validation_errors() {
        for input in ["data:image/png;base64,@@@", "data:image/png;base64,", ""] {
            assert!(matches!(
                decode_data_url(input),
                Err(BlogError::Validation(_))
            ));
        }
    }

    #[test]
    fn kind_prefers_media_type() {
        let field = ImageField {
            what: "test",
            data: "data:image/gif;base64,QQ==",
            client_name: "photo.png",
            limit: 10,
        };
        assert_eq!(field.decode().unwrap().kind, ImageKind::Gif);

        let field = ImageField {
            what: "test",
            data: "QQ==",
            client_name: "photo.JPEG",
            limit: 10,
        };
        assert_eq!(field.decode().unwrap().kind, ImageKind::Jpeg);
    }

    #[test]
    fn unknown_kind_and_oversize_are_rejected() {
        let field = ImageField {
            what: "test",
            data: "data:text/plain;base64,QQ==",
            client_name: "notes.txt",
            limit: 10,
        };
        assert!(matches!(field.decode(), Err(BlogError::Validation(_))));

        let field = ImageField {
            what: "test",
            data: "data:image/png;base64,QUFBQQ==",
            client_name: "a.png",
            limit: 2,
        };
        assert!(matches!(field.decode(), Err(BlogError::TooLarge { .. })));
    }

    #[test]
    fn declared_media_type_is_not_overridden_by_the_name() {
        for data in [
            "data:text/html;base64,PGgxPmhpPC9oMT4=",
            "data:application/octet-stream;base64,QQ==",
            "data:image/webp;base64,QQ==",
        ] {
            let field = ImageField {
                what: "test",
                data,
                client_name: "x.png",
                limit: 64,
            };
            assert!(
                matches!(field.decode(), Err(BlogError::Validation(_))),
                "{data} should be rejected"
            );
        }
    }

    #[test]
    fn client_path_is_rejected() {
        let field = ImageField {
            what: "test",
            data: "data:image/png;base64,QQ==",
            client_name: "../../etc/passwd",
            limit: 10,
        };
        assert!(matches!(field.decode(), Err(BlogError::Validation(_))));
    }
}

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use fragments_core::{FragmentId, OwnerId};
use fragments_model::Fragment;
use fragments_store::{FragmentKey, FragmentStore};

use crate::error::ConvertError;
use crate::registry::{ConversionRegistry, normalize_extension};

/// Output of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub data: Bytes,
    /// Content type of `data`, parameters included.
    pub content_type: String,
}

/// Renders stored fragments through a [`ConversionRegistry`].
///
/// Conversion only reads from the store; the fragment is never modified.
#[derive(Clone)]
pub struct ConversionService {
    store: Arc<dyn FragmentStore>,
    registry: Arc<ConversionRegistry>,
}

impl ConversionService {
    pub fn new(store: Arc<dyn FragmentStore>, registry: Arc<ConversionRegistry>) -> Self {
        Self { store, registry }
    }

    /// Service over the built-in conversions.
    pub fn with_defaults(store: Arc<dyn FragmentStore>) -> Self {
        Self::new(store, Arc::new(ConversionRegistry::with_defaults()))
    }

    pub fn registry(&self) -> &ConversionRegistry {
        &self.registry
    }

    /// Convert fragment `(owner, id)` to the representation named by
    /// `extension`.
    pub async fn convert(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        extension: &str,
    ) -> Result<Converted, ConvertError> {
        let fragment = Fragment::by_id(&self.store, owner, id)
            .await?
            .ok_or_else(|| ConvertError::NotFound(FragmentKey::new(owner.clone(), id.clone())))?;

        let source_type = fragment.media_type().to_owned();
        if !self.registry.supports_source(&source_type) {
            warn!(%owner, %id, %source_type, "no conversion from source type");
            return Err(ConvertError::UnsupportedConversion {
                source_type,
                extension: None,
            });
        }

        let extension = normalize_extension(extension);
        let Some(converter) = self.registry.get(&source_type, &extension) else {
            warn!(%owner, %id, %source_type, %extension, "no conversion for extension");
            return Err(ConvertError::UnsupportedConversion {
                source_type,
                extension: Some(extension),
            });
        };

        let input = fragment.get_data().await?.unwrap_or_default();
        let data = converter.convert(&input)?;

        info!(
            %owner,
            %id,
            %source_type,
            %extension,
            input_size = input.len(),
            output_size = data.len(),
            "converted fragment"
        );
        Ok(Converted {
            data,
            content_type: converter.result_type().to_owned(),
        })
    }
}

impl std::fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionService")
            .field("backend", &self.store.backend_name())
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use fragments_model::NewFragment;
    use fragments_store_memory::MemoryFragmentStore;

    use super::*;

    fn service() -> (ConversionService, Arc<dyn FragmentStore>) {
        let store: Arc<dyn FragmentStore> = Arc::new(MemoryFragmentStore::new());
        (ConversionService::with_defaults(Arc::clone(&store)), store)
    }

    async fn saved(store: &Arc<dyn FragmentStore>, content_type: &str, body: &str) -> Fragment {
        let fragment = Fragment::new(
            Arc::clone(store),
            NewFragment::new("u1", content_type).with_data(body.to_owned()),
        )
        .unwrap();
        fragment.save().await.unwrap();
        fragment
    }

    #[tokio::test]
    async fn markdown_converts_to_html() {
        let (service, store) = service();
        let fragment = saved(&store, "text/markdown", "# Hi\n\n**x**").await;

        let out = service
            .convert(fragment.owner(), fragment.id(), "html")
            .await
            .unwrap();
        assert_eq!(out.content_type, "text/html; charset=utf-8");

        let body = String::from_utf8(out.data.to_vec()).unwrap();
        assert!(body.contains("<h1>Hi</h1>"));
        assert!(body.contains("<strong>x</strong>"));
    }

    #[tokio::test]
    async fn legacy_markdown_alias_and_dotted_extension() {
        let (service, store) = service();
        let fragment = saved(&store, "text/x-markdown", "*em*").await;

        let out = service
            .convert(fragment.owner(), fragment.id(), ".HTML")
            .await
            .unwrap();
        assert!(out.data.starts_with(b"<p><em>em</em></p>"));
    }

    #[tokio::test]
    async fn stored_raw_html_is_escaped_on_conversion() {
        let (service, store) = service();
        let fragment = saved(
            &store,
            "text/markdown",
            "# T\n\n<script>alert(1)</script>\n\n<img src=x onerror=alert(2)>",
        )
        .await;

        let out = service
            .convert(fragment.owner(), fragment.id(), "html")
            .await
            .unwrap();
        let body = String::from_utf8(out.data.to_vec()).unwrap();
        assert!(body.contains("<h1>T</h1>"));
        assert!(!body.contains("<script"), "{body}");
        assert!(!body.contains("<img"), "{body}");
        assert!(body.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn missing_fragment_is_not_found() {
        let (service, _store) = service();
        let err = service
            .convert(&OwnerId::new("u1"), &FragmentId::new("nope"), "html")
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::NotFound(_)));
    }

    #[tokio::test]
    async fn other_owner_is_not_found() {
        let (service, store) = service();
        let fragment = saved(&store, "text/markdown", "# mine").await;

        let err = service
            .convert(&OwnerId::new("u2"), fragment.id(), "html")
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::NotFound(_)));
    }

    #[tokio::test]
    async fn plain_text_source_is_unsupported() {
        let (service, store) = service();
        let fragment = saved(&store, "text/plain", "hello").await;

        let err = service
            .convert(fragment.owner(), fragment.id(), "html")
            .await
            .unwrap_err();
        match err {
            ConvertError::UnsupportedConversion {
                source_type,
                extension,
            } => {
                assert_eq!(source_type, "text/plain");
                assert!(extension.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_extension_is_unsupported() {
        let (service, store) = service();
        let fragment = saved(&store, "text/markdown", "# Hi").await;

        let err = service
            .convert(fragment.owner(), fragment.id(), "txt")
            .await
            .unwrap_err();
        match err {
            ConvertError::UnsupportedConversion {
                source_type,
                extension,
            } => {
                assert_eq!(source_type, "text/markdown");
                assert_eq!(extension.as_deref(), Some("txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_payload_converts_as_empty() {
        let (service, store) = service();
        let fragment =
            Fragment::new(Arc::clone(&store), NewFragment::new("u1", "text/markdown")).unwrap();
        fragment.save().await.unwrap();

        let out = service
            .convert(fragment.owner(), fragment.id(), "html")
            .await
            .unwrap();
        assert!(out.data.is_empty());
    }

    #[tokio::test]
    async fn conversion_leaves_fragment_untouched() {
        let (service, store) = service();
        let fragment = saved(&store, "text/markdown", "# Hi").await;
        let before = fragment.snapshot();

        service
            .convert(fragment.owner(), fragment.id(), "html")
            .await
            .unwrap();

        let after = Fragment::load(&store, fragment.owner(), fragment.id())
            .await
            .unwrap();
        assert_eq!(after.snapshot(), before);
        assert_eq!(after.data().await.unwrap(), Bytes::from_static(b"# Hi"));
    }
}

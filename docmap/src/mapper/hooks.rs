use crate::errors::DocmapResult;
use crate::mapper::MappedDocument;

/// The kind of write a save operation decided to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveMode {
    Insert,
    Update,
    Upsert,
}

impl SaveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveMode::Insert => "insert",
            SaveMode::Update => "update",
            SaveMode::Upsert => "upsert",
        }
    }
}

/// Contract for lifecycle hooks invoked around load, save, and delete.
///
/// Hooks intercept the mapped document at fixed points in the mapping
/// lifecycle, for validation, enrichment, or bookkeeping. Save and load
/// hooks receive the document itself, so any mutation a hook makes goes
/// through the tracked accessors and joins the pending write. All methods
/// default to no-ops.
///
/// Hook errors are not wrapped: an error from a hook propagates unmodified
/// and aborts the enclosing operation before any tracked state is cleared,
/// leaving the changed set and pending operations intact for inspection or
/// retry.
///
/// # Usage
///
/// ```rust,ignore
/// struct Timestamps;
///
/// impl LifecycleHooks for Timestamps {
///     fn before_save(
///         &self,
///         mode: SaveMode,
///         document: &mut MappedDocument,
///     ) -> DocmapResult<()> {
///         if mode == SaveMode::Insert {
///             document.set("created_at", Value::from(chrono::Utc::now().timestamp()))?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait LifecycleHooks: Send + Sync {
    /// Invoked after in-memory state is cleared for a load, before the
    /// loaded values are assigned.
    fn before_load(&self) -> DocmapResult<()> {
        Ok(())
    }

    /// Invoked after loaded values are assigned; may transform them.
    fn after_load(&self, _document: &mut MappedDocument) -> DocmapResult<()> {
        Ok(())
    }

    /// Invoked before a save is submitted; may adjust the pending write
    /// through the document's accessors.
    fn before_save(&self, _mode: SaveMode, _document: &mut MappedDocument) -> DocmapResult<()> {
        Ok(())
    }

    /// Invoked after a successful save, once tracked state is cleared.
    fn after_save(&self) -> DocmapResult<()> {
        Ok(())
    }

    /// Invoked before a delete is submitted.
    fn before_delete(&self) -> DocmapResult<()> {
        Ok(())
    }

    /// Invoked after a successful delete, once state is reset.
    fn after_delete(&self) -> DocmapResult<()> {
        Ok(())
    }
}

/// The default hook set: every method is a no-op.
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}

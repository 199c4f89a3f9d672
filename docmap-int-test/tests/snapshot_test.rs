use docmap::common::Value;
use docmap::errors::DocmapResult;
use docmap::mapper::{Criteria, MappedDocument, Operator, Snapshot};
use docmap_int_test::test_util::memory_collection;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_parked_edit_resumes_and_saves() -> DocmapResult<()> {
    let collection = memory_collection("drafts");

    let mut draft = MappedDocument::builder(collection.clone())
        .alias("body", "b")
        .build();
    draft.set("body", "first cut")?;
    draft.save(true)?;
    let identity = draft.id();

    // edit in flight: one assignment, one operator
    draft.set("body", "second cut")?;
    draft.inc("revision", 1)?;
    let parked = draft.snapshot().to_json()?;
    drop(draft);

    // later, a different holder resumes the edit
    let snapshot = Snapshot::from_json(&parked)?;
    let mut resumed = MappedDocument::builder(collection.clone()).restore(snapshot)?;
    assert!(resumed.is_changed(Some("body")));
    assert_eq!(
        resumed.operations().entry(Operator::Inc, "revision"),
        Some(&Value::I32(1))
    );

    resumed.save(true)?;

    let mut stored = MappedDocument::new(collection);
    assert!(stored.load(Criteria::Id(identity), &[])?);
    assert_eq!(stored.get("b")?, Value::from("second cut"));
    assert_eq!(stored.get("revision")?, Value::I64(1));
    Ok(())
}

#[test]
fn test_snapshot_preserves_aliases_and_identity() -> DocmapResult<()> {
    let collection = memory_collection("drafts");

    let mut draft = MappedDocument::builder(collection.clone())
        .alias("body", "b")
        .build();
    draft.set("body", "text")?;
    draft.save(true)?;
    let identity = draft.id();

    let snapshot = draft.snapshot();
    let mut resumed = MappedDocument::builder(collection).restore(snapshot)?;

    assert_eq!(resumed.id(), identity);
    assert!(resumed.is_loaded());
    // the alias map traveled with the snapshot
    assert_eq!(resumed.get("body")?, Value::from("text"));
    Ok(())
}

#[test]
fn test_snapshot_keeps_dirty_marks() -> DocmapResult<()> {
    let collection = memory_collection("pages");

    let mut page = MappedDocument::new(collection.clone());
    page.set("hits", 0)?;
    page.save(true)?;
    page.inc("hits", 3)?;
    page.save(true)?;

    // hits is dirty: its stored value was computed by the store
    let snapshot = page.snapshot();
    let mut resumed = MappedDocument::builder(collection).restore(snapshot)?;
    assert!(resumed.is_changed(Some("hits")));

    // the first read after resuming observes the store-computed value
    assert_eq!(resumed.get("hits")?, Value::I64(3));
    Ok(())
}

use docmap::common::Value;
use docmap::errors::{DocmapResult, ErrorKind};
use docmap::mapper::{factory, Criteria, MappedDocument};
use docmap_int_test::test_util::{memory_collection, register_memory_model};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_cascade_saves_unsaved_target_first() -> DocmapResult<()> {
    let authors = register_memory_model("ref_cascade_author", "authors");

    let mut post = MappedDocument::builder(memory_collection("posts"))
        .reference("author", "ref_cascade_author", "author_id")
        .build();

    let author = factory("ref_cascade_author", None)?;
    author.lock().set("name", "alice")?;
    post.assign_reference("author", author.clone())?;
    post.set("title", "Hello")?;

    post.save(true)?;

    // the author saved first and its new identity landed in the post
    let author_id = author.lock().id();
    assert!(author_id.is_key());
    assert_eq!(post.get("author_id")?, author_id);

    let mut stored = MappedDocument::new(authors);
    assert!(stored.load(Criteria::Id(author_id), &[])?);
    assert_eq!(stored.get("name")?, Value::from("alice"));
    Ok(())
}

#[test]
fn test_cascade_saves_changed_target() -> DocmapResult<()> {
    let authors = register_memory_model("ref_changed_author", "authors");

    let author = factory("ref_changed_author", None)?;
    author.lock().set("name", "alice")?;
    author.lock().save(true)?;
    let author_id = author.lock().id();

    let mut post = MappedDocument::builder(memory_collection("posts"))
        .reference("author", "ref_changed_author", "author_id")
        .build();
    post.assign_reference("author", author.clone())?;
    post.set("title", "Hello")?;

    // a pending change on the cached target rides along with the owner save
    author.lock().set("name", "alice the author")?;
    post.save(true)?;
    assert!(!author.lock().is_changed(None));

    let mut stored = MappedDocument::new(authors);
    assert!(stored.load(Criteria::Id(author_id), &[])?);
    assert_eq!(stored.get("name")?, Value::from("alice the author"));
    Ok(())
}

#[test]
fn test_reference_resolves_lazily_from_foreign_key() -> DocmapResult<()> {
    register_memory_model("ref_lazy_author", "authors");
    let posts = memory_collection("posts");

    let author = factory("ref_lazy_author", None)?;
    author.lock().set("name", "alice")?;
    author.lock().save(true)?;
    let author_id = author.lock().id();

    let mut post = MappedDocument::builder(posts.clone())
        .reference("author", "ref_lazy_author", "author_id")
        .build();
    post.set("title", "Hello")?;
    post.set("author_id", author_id)?;
    post.save(true)?;
    let post_id = post.id();

    // a fresh view resolves the reference from the stored foreign key
    let mut view = MappedDocument::builder(posts)
        .reference("author", "ref_lazy_author", "author_id")
        .identity(post_id)
        .build();
    let resolved = view.reference("author")?;
    assert_eq!(resolved.lock().get("name")?, Value::from("alice"));

    // the resolved target is cached
    let again = view.reference("author")?;
    assert!(std::sync::Arc::ptr_eq(&resolved, &again));
    Ok(())
}

#[test]
fn test_reference_without_foreign_key_yields_fresh_target() -> DocmapResult<()> {
    register_memory_model("ref_fresh_author", "authors");

    let mut post = MappedDocument::builder(memory_collection("posts"))
        .reference("author", "ref_fresh_author", "author_id")
        .build();
    post.set("title", "Hello")?;

    let resolved = post.reference("author")?;
    assert!(!resolved.lock().has_id());
    Ok(())
}

#[test]
fn test_unregistered_target_model() -> DocmapResult<()> {
    let mut post = MappedDocument::builder(memory_collection("posts"))
        .reference("author", "ref_never_registered", "author_id")
        .build();
    post.set("author_id", "a-1")?;

    let result = post.reference("author");
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().kind(), &ErrorKind::ModelNotFound);
    Ok(())
}

#[test]
fn test_cascade_failure_aborts_owner_save() -> DocmapResult<()> {
    register_memory_model("ref_failing_author", "authors");

    let mut post = MappedDocument::builder(memory_collection("posts"))
        .reference("author", "ref_failing_author", "author_id")
        .build();

    // an empty unsaved target has nothing to insert, so the cascade fails
    let author = factory("ref_failing_author", None)?;
    post.assign_reference("author", author)?;
    post.set("title", "Hello")?;

    let result = post.save(true);
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().kind(), &ErrorKind::EmptyInsert);
    // the owner never reached the store and keeps its pending change
    assert!(post.is_changed(Some("title")));
    assert!(!post.has_id());
    Ok(())
}

#[test]
fn test_clear_drops_cached_reference() -> DocmapResult<()> {
    register_memory_model("ref_clear_author", "authors");

    let mut post = MappedDocument::builder(memory_collection("posts"))
        .reference("author", "ref_clear_author", "author_id")
        .build();
    let first = post.reference("author")?;
    post.clear();
    let second = post.reference("author")?;
    assert!(!std::sync::Arc::ptr_eq(&first, &second));
    Ok(())
}

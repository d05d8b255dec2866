use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use textdoc::{
    CompactDocument, DocumentBuilder, DocumentCodec, MaterializedDocument, SentenceMutation,
    Tag, TagBuilder, TagBuilderRegistry, Term, TokenizingBuilder, Word,
};
use textdoc_common::{Result, error::ErrorKind};
use uuid::Uuid;

/// Named-entity builder counting how often `build` runs.
struct CountingEntityBuilder {
    values: Vec<&'static str>,
    builds: AtomicUsize,
}

impl CountingEntityBuilder {
    fn new() -> Self {
        CountingEntityBuilder {
            values: vec!["UNKNOWN", "PERSON", "ORGANIZATION", "LOCATION"],
            builds: AtomicUsize::new(0),
        }
    }

    fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl TagBuilder for CountingEntityBuilder {
    fn type_name(&self) -> &str {
        "NE"
    }

    fn build(&self, code: u32) -> Result<Tag> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let value = self.values.get(code as usize).ok_or_else(|| {
            textdoc_common::error::Error::corrupt_document("NE tag code", code.to_string())
        })?;
        Ok(Tag::new("NE", *value))
    }

    fn code_of(&self, value: &str) -> Option<u32> {
        self.values.iter().position(|v| *v == value).map(|p| p as u32)
    }
}

fn counting_registry() -> (Arc<CountingEntityBuilder>, Arc<TagBuilderRegistry>) {
    let counter = Arc::new(CountingEntityBuilder::new());
    let mut registry = TagBuilderRegistry::new();
    registry.register_shared(counter.clone());
    (counter, Arc::new(registry))
}

#[test]
fn test_hello_world_document() {
    let doc = TokenizingBuilder::default()
        .build("Hello world. Bye.", Some("t1"))
        .unwrap();

    assert_eq!(doc.title(), "t1");
    assert_eq!(doc.sentence_count(), 2);
    let sentence_words = |s: usize| {
        doc.sentence(s)
            .unwrap()
            .terms()
            .iter()
            .map(|t| doc.term_text(t))
            .collect::<Vec<_>>()
    };
    assert_eq!(sentence_words(0), vec!["Hello", "world."]);
    assert_eq!(sentence_words(1), vec!["Bye."]);
    assert_eq!(
        doc.term_table().iter().collect::<Vec<_>>(),
        vec!["Hello", "world.", "Bye."]
    );

    let codec = DocumentCodec::new(Arc::new(TagBuilderRegistry::standard()));
    let decoded = codec
        .decode_from_slice(&codec.encode_to_vec(&doc).unwrap())
        .unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_entity_tag_is_built_once() {
    let (counter, registry) = counting_registry();
    let mut builder = DocumentBuilder::with_registry(Arc::clone(&registry));
    builder
        .push_tagged_term("Paris", "", &[Tag::new("NE", "LOCATION")], false)
        .unwrap();
    let doc = builder.build().unwrap();
    assert_eq!(doc.term(0, 0).unwrap().tag_codes(0), &[3]);

    let view = MaterializedDocument::new(Arc::new(doc), &registry).unwrap();
    let sentence = view.sentence(0).unwrap();
    let expected = Tag::new("NE", "LOCATION");
    for _ in 0..5 {
        let term = sentence.get(0).unwrap();
        assert_eq!(term.tags(), &[expected.clone()]);
    }
    assert_eq!(counter.builds(), 1);

    let again: Vec<_> = sentence.iter().collect::<Result<_>>().unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(counter.builds(), 1);
}

#[test]
fn test_repeated_reads_are_equal() {
    let (counter, registry) = counting_registry();
    let mut builder = DocumentBuilder::with_registry(Arc::clone(&registry));
    for (i, word) in ["Grace", "met", "Alan", "."].iter().enumerate() {
        let tags = if i % 2 == 0 {
            vec![Tag::new("NE", "PERSON")]
        } else {
            vec![]
        };
        builder.push_tagged_term(word, " ", &tags, false).unwrap();
    }
    let view = MaterializedDocument::new(Arc::new(builder.build().unwrap()), &registry).unwrap();
    let sentence = view.sentence(0).unwrap();

    let first: Vec<Term> = sentence.to_vec(0..sentence.len()).unwrap();
    let second: Vec<Term> = sentence.to_vec(0..sentence.len()).unwrap();
    assert_eq!(first, second);
    assert_eq!(counter.builds(), 2);
    assert_eq!(first[2].word(), &Word::new("Alan", " "));
}

#[test]
fn test_mutation_leaves_document_unchanged() {
    let registry = Arc::new(TagBuilderRegistry::standard());
    let doc = TokenizingBuilder::default()
        .build("Nothing changes here. Ever.", None)
        .unwrap();
    let codec = DocumentCodec::new(Arc::clone(&registry));
    let before = codec.encode_to_vec(&doc).unwrap();

    let doc = Arc::new(doc);
    let view = MaterializedDocument::new(Arc::clone(&doc), &registry).unwrap();
    let sentence = view.sentence(0).unwrap();
    let term = sentence.get(0).unwrap().clone();
    for mutation in [
        SentenceMutation::Remove(0),
        SentenceMutation::Insert(1, term.clone()),
        SentenceMutation::Push(term),
        SentenceMutation::Clear,
    ] {
        let err = sentence.apply(mutation).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedMutation { .. }));
    }

    assert_eq!(codec.encode_to_vec(&doc).unwrap(), before);
    assert_eq!(sentence.len(), 3);
}

#[test]
fn test_empty_document_and_sentences() {
    let registry = Arc::new(TagBuilderRegistry::standard());
    let codec = DocumentCodec::new(Arc::clone(&registry));

    let empty = DocumentBuilder::new().build().unwrap();
    let decoded = codec
        .decode_from_slice(&codec.encode_to_vec(&empty).unwrap())
        .unwrap();
    assert_eq!(decoded, empty);
    assert_eq!(decoded.sentence_count(), 0);

    let mut builder = DocumentBuilder::new();
    builder.id(Uuid::from_u128(9));
    builder.end_sentence();
    builder.push_term("lonely", "");
    builder.end_sentence();
    builder.end_sentence();
    let doc = builder.build().unwrap();
    let decoded = codec
        .decode_from_slice(&codec.encode_to_vec(&doc).unwrap())
        .unwrap();
    assert_eq!(decoded, doc);

    let view = MaterializedDocument::new(Arc::new(decoded), &registry).unwrap();
    let lens: Vec<_> = view.sentences().map(|s| s.len()).collect();
    assert_eq!(lens, vec![0, 1, 0]);
    assert_eq!(view.text(), "lonely");
}

#[test]
fn test_concurrent_materialization() {
    let (counter, registry) = counting_registry();
    let mut builder = DocumentBuilder::with_registry(Arc::clone(&registry));
    for s in 0..8 {
        for t in 0..50 {
            let value = if (s + t) % 3 == 0 { "PERSON" } else { "UNKNOWN" };
            builder
                .push_tagged_term(&format!("w{t}"), " ", &[Tag::new("NE", value)], false)
                .unwrap();
        }
        builder.end_sentence();
    }
    let doc: CompactDocument = builder.build().unwrap();
    let view = MaterializedDocument::new(Arc::new(doc), &registry).unwrap();

    let results: Vec<Vec<Term>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    view.sentences()
                        .flat_map(|s| s.to_vec(0..s.len()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for other in &results[1..] {
        assert_eq!(other, &results[0]);
    }
    assert_eq!(results[0].len(), 400);
    // racing readers may decode a position more than once, but never more than once
    // per reader
    assert!(counter.builds() >= 400 && counter.builds() <= 1600);

    let settled = counter.builds();
    let _ = view.sentence(3).unwrap().get(7).unwrap();
    assert_eq!(counter.builds(), settled);
}

#[test]
fn test_documents_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompactDocument>();
    assert_send_sync::<MaterializedDocument>();
    assert_send_sync::<TokenizingBuilder>();
    assert_send_sync::<DocumentCodec>();
}

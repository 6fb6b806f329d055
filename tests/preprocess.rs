//! End-to-end markdown math preprocessing through the KaTeX pool.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use texweave::{EnginePool, KatexPool, MathPreprocessor, PoolSettings, RenderError};

fn katex_pool(engines: usize, timeout: Duration) -> Arc<KatexPool> {
    let settings = PoolSettings::default()
        .with_engine_count(NonZeroUsize::new(engines).expect("engine count is non-zero"))
        .with_lock_timeout(timeout);

    Arc::new(EnginePool::katex(&settings).expect("KaTeX pool should build"))
}

#[tokio::test]
async fn renders_markdown_document() {
    let pool = katex_pool(2, Duration::from_secs(5));
    let preprocessor = MathPreprocessor::new(pool);

    let markdown = "\nThis is some markdown ...\n\n## Hello world!\n\n$ c = \\pm\\sqrt{a^2 + b^2} $\n\n$$\n\nc = \\pm\\sqrt{a^2 + b^2}\n\n$$\n\n$$E = mc^2$$\n\n### Bye world!\n\nTest empty delimiters 1\n\n$ $\n\nTest empty delimiters 2\n\n$$\n\n\n$$\n";

    let processed = preprocessor
        .process(markdown)
        .await
        .expect("well-formed math should render");

    assert!(processed.contains("class=\"katex\""));
    assert!(!processed.contains("E = mc^2"));

    // Surrounding markdown is untouched, and empty delimiters stay literal.
    assert!(processed.contains("## Hello world!"));
    assert!(processed.contains("### Bye world!"));
    assert!(processed.contains("$ $"));
}

#[tokio::test]
async fn malformed_expression_degrades_inline() {
    let pool = katex_pool(1, Duration::from_secs(5));
    let preprocessor = MathPreprocessor::new(pool);

    let processed = preprocessor
        .process("ok $ x $ broken $ \\frac{ $ end")
        .await
        .expect("one bad expression must not abort the document");

    assert!(processed.contains("data-math-error"));
    assert!(processed.ends_with(" end"));
    assert!(processed.contains("class=\"katex\""));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn overloaded_pool_rejects_with_distinct_error() {
    let pool = katex_pool(1, Duration::from_millis(1));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.render_one("c = \\pm\\sqrt{a^2 + b^2}").await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("render task should not panic"))
        .collect();

    assert!(
        results
            .iter()
            .any(|result| matches!(result, Err(RenderError::LockTimeout { .. })))
    );
    for result in results {
        if let Err(err) = result {
            assert!(matches!(err, RenderError::LockTimeout { .. }));
        }
    }
}

#[tokio::test]
async fn shared_pool_renders_with_default_settings() {
    // First accessor call builds the pool; no configure means the defaults.
    let pool = texweave::engine_pool();

    let html = pool
        .render_one("x^2")
        .await
        .expect("shared pool should render");

    assert!(html.contains("katex"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn ample_pool_serves_concurrent_documents() {
    let pool = katex_pool(4, Duration::from_secs(10));

    let tasks: Vec<_> = (0..4)
        .map(|index| {
            let preprocessor = MathPreprocessor::new(Arc::clone(&pool));
            tokio::spawn(async move {
                let text = format!("doc {index}: $ a_{index} + b $");
                preprocessor.process(&text).await
            })
        })
        .collect();

    for joined in futures::future::join_all(tasks).await {
        let processed = joined
            .expect("document task should not panic")
            .expect("ample pool should serve every document");
        assert!(processed.contains("class=\"katex\""));
    }
}

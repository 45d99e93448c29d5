use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use futures::future::join_all;
use tracing::info;

use crate::error::{TaskError, report};
use crate::model::config::AttributeSyntax;
use crate::model::document::DocumentRef;
use crate::model::task::Task;
use crate::parse::document_parser::parse_document;

/// Read one document and parse its tasks.
///
/// A panic while reading or parsing is caught and returned as a parse error
/// carrying the document path.
pub async fn read_and_parse(
    document: &DocumentRef,
    syntax: AttributeSyntax,
) -> Result<Vec<Task>, TaskError> {
    let work = async {
        let content = document
            .read_content()
            .await
            .map_err(|e| TaskError::read(document.path(), e))?;
        Ok::<_, TaskError>(parse_document(&content, document, syntax))
    };
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(TaskError::from_panic(document.path(), payload)),
    }
}

/// Parse many documents concurrently.
///
/// The result has one entry per input document, in input order. A document
/// that fails is reported and contributes an empty task list.
pub async fn parse_documents(documents: &[DocumentRef], syntax: AttributeSyntax) -> Vec<Vec<Task>> {
    let started = Instant::now();
    info!(documents = documents.len(), "parsing documents");

    let parses = documents.iter().map(|document| async move {
        match read_and_parse(document, syntax).await {
            Ok(tasks) => tasks,
            Err(err) => {
                report(&err);
                Vec::new()
            }
        }
    });
    let results = join_all(parses).await;

    let tasks: usize = results.iter().map(Vec::len).sum();
    info!(
        documents = results.len(),
        tasks,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "parsed documents"
    );
    results
}

// ABOUTME: Drains every page of a table's rows into one in-memory list
// ABOUTME: Follows either cursor (`after`) or offset/total pagination

use crate::error::{Error, Result};
use crate::hubdb::{HubDbApi, PageRequest, Row, RowPage, TableId};

/// Fetch every row of a table.
///
/// Pages are requested one after another; the protocol of each response
/// decides how the next page is addressed. Any failed page aborts the walk
/// and the rows collected so far are dropped.
///
/// # Arguments
///
/// * `api` - HubDB data access
/// * `table_id` - Table whose draft rows are read
///
/// # Returns
///
/// All rows in page order. A cursor returned twice in a row, or an empty
/// page before `total` is reached, fails with `UnexpectedResponse`.
pub async fn fetch_all_rows(api: &dyn HubDbApi, table_id: &TableId) -> Result<Vec<Row>> {
    let mut rows: Vec<Row> = Vec::new();
    let mut request = PageRequest::First;
    let mut count: u64 = 0;
    let mut page_number = 0usize;

    loop {
        page_number += 1;
        let page = api.fetch_rows(table_id, &request).await?;

        let next = match page {
            RowPage::Cursor { results, paging } => {
                tracing::debug!(
                    "Fetched page {} of table {}: {} rows",
                    page_number,
                    table_id,
                    results.len()
                );
                rows.extend(results);

                match paging.and_then(|p| p.next).and_then(|n| n.after) {
                    Some(after) => {
                        if request == PageRequest::After(after.clone()) {
                            return Err(Error::unexpected(
                                "fetch rows",
                                format!("cursor \"{}\" was returned twice", after),
                            ));
                        }
                        Some(PageRequest::After(after))
                    }
                    None => None,
                }
            }
            RowPage::Offset { objects, total } => {
                tracing::debug!(
                    "Fetched page {} of table {}: {} rows ({} total)",
                    page_number,
                    table_id,
                    objects.len(),
                    total
                );
                let fetched = objects.len() as u64;
                count += fetched;
                rows.extend(objects);

                if count >= total {
                    None
                } else if fetched == 0 {
                    return Err(Error::unexpected(
                        "fetch rows",
                        format!("empty page after {} of {} rows", count, total),
                    ));
                } else {
                    Some(PageRequest::Offset(count))
                }
            }
        };

        match next {
            Some(next) => request = next,
            None => break,
        }
    }

    tracing::debug!(
        "Fetched {} rows of table {} in {} page(s)",
        rows.len(),
        table_id,
        page_number
    );

    Ok(rows)
}

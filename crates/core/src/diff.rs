use crate::model::{Change, ChangeKind, StockItem};

/// Compares the previous snapshot with the current one.
///
/// Output follows the order of `current`, at most one change per item.
/// With no (or an empty) previous snapshot every in-stock item is reported as
/// new. Otherwise an id missing from `previous` is reported as added whatever
/// its availability, and an out-of-stock to in-stock transition as a restock.
/// Going out of stock is never reported.
pub fn diff_stock(previous: Option<&[StockItem]>, current: &[StockItem]) -> Vec<Change> {
    let previous = previous.filter(|p| !p.is_empty());

    let Some(previous) = previous else {
        return current
            .iter()
            .filter(|item| item.in_stock)
            .map(|item| Change::new(ChangeKind::NewItemInStock, item.name.clone()))
            .collect();
    };

    current
        .iter()
        .filter_map(|item| match previous.iter().find(|p| p.id == item.id) {
            None => Some(Change::new(ChangeKind::ItemAdded, item.name.clone())),
            Some(prev) if !prev.in_stock && item.in_stock => {
                Some(Change::new(ChangeKind::ItemRestocked, item.name.clone()))
            }
            Some(_) => None,
        })
        .collect()
}

/// Renders changes as notification lines.
pub fn render_changes(changes: &[Change]) -> Vec<String> {
    changes.iter().map(ToString::to_string).collect()
}

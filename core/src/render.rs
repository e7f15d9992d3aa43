//! Plain-text tables for deal listings.

use crate::asset::DealSide;
use crate::deal::{DealEntity, DealList, DealListing};

const INDEX_WIDTH: usize = 6;
const IDENTITY_WIDTH: usize = 60;
const NAME_WIDTH: usize = 8;
const AMOUNT_WIDTH: usize = 12;
const RULE_WIDTH: usize = INDEX_WIDTH + 3 * IDENTITY_WIDTH + 2 * NAME_WIDTH + 5 * AMOUNT_WIDTH + 27;

/// Column titles shared by every table.
pub fn table_header() -> String {
    format_row([
        "#",
        "Acceptor ID",
        "Offered QU",
        "Offered asset issuer",
        "Name",
        "Amount",
        "Requested QU",
        "Requested asset issuer",
        "Name",
        "Amount",
    ])
}

/// Rows for one deal: one per asset position, at least one.
///
/// Index, acceptor and QU amounts only appear on the first row; a side with
/// fewer assets than the other leaves its cells blank.
pub fn deal_rows(entity: &DealEntity) -> Vec<String> {
    let deal = &entity.deal;
    (0..deal.row_count())
        .map(|i| {
            let (index, acceptor, offered_qu, requested_qu) = if i == 0 {
                (
                    entity.index.to_string(),
                    deal.acceptor.to_identity(),
                    deal.offered.qu().to_string(),
                    deal.requested.qu().to_string(),
                )
            } else {
                Default::default()
            };
            let (o_issuer, o_name, o_amount) = asset_cells(&deal.offered, i);
            let (r_issuer, r_name, r_amount) = asset_cells(&deal.requested, i);

            format_row([
                index.as_str(),
                acceptor.as_str(),
                offered_qu.as_str(),
                o_issuer.as_str(),
                o_name.as_str(),
                o_amount.as_str(),
                requested_qu.as_str(),
                r_issuer.as_str(),
                r_name.as_str(),
                r_amount.as_str(),
            ])
        })
        .collect()
}

/// Title, header and every deal of one list.
pub fn render_table(list: DealList, deals: &[DealEntity]) -> String {
    let mut out = format!("{}\n{}\n", list.title(), table_header());
    for entity in deals {
        for row in deal_rows(entity) {
            out.push_str(&row);
            out.push('\n');
        }
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
    }
    out
}

/// Summary counts followed by the owned, proposed and opened tables.
pub fn render_listing(listing: &DealListing) -> String {
    let mut out = format!("Current value of counter: {}\n", listing.counter);
    for list in [DealList::Owned, DealList::Proposed, DealList::Opened] {
        out.push_str(&format!("{} deals: {}\n", list, listing.list(list).len()));
    }
    for list in [DealList::Owned, DealList::Proposed, DealList::Opened] {
        out.push('\n');
        out.push_str(&render_table(list, listing.list(list)));
    }
    out
}

fn asset_cells(side: &DealSide, position: usize) -> (String, String, String) {
    side.assets()
        .get(position)
        .map(|asset| {
            (
                asset.issuer().to_identity(),
                asset.name().to_text(),
                asset.amount().to_string(),
            )
        })
        .unwrap_or_default()
}

fn format_row(cells: [&str; 10]) -> String {
    let [index, acceptor, o_qu, o_issuer, o_name, o_amount, r_qu, r_issuer, r_name, r_amount] =
        cells;
    format!(
        "{index:<iw$} | {acceptor:<idw$} | {o_qu:>aw$} | {o_issuer:<idw$} | {o_name:<nw$} | {o_amount:>aw$} | {r_qu:>aw$} | {r_issuer:<idw$} | {r_name:<nw$} | {r_amount:>aw$}",
        iw = INDEX_WIDTH,
        idw = IDENTITY_WIDTH,
        nw = NAME_WIDTH,
        aw = AMOUNT_WIDTH,
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetAmount, AssetName};
    use crate::deal::Deal;
    use crate::identity::PublicKey;

    fn side(qu: i64, names: &[&str]) -> DealSide {
        let mut side = DealSide::new(qu);
        for (i, name) in names.iter().enumerate() {
            side.push_asset(AssetAmount::new(
                PublicKey([i as u8 + 1; 32]),
                AssetName::new(name),
                (i as i64 + 1) * 10,
            ));
        }
        side
    }

    // column boundaries of the offered asset cells
    fn offered_cells(row: &str) -> &str {
        let start = INDEX_WIDTH + IDENTITY_WIDTH + AMOUNT_WIDTH + 9;
        let end = start + IDENTITY_WIDTH + NAME_WIDTH + AMOUNT_WIDTH + 6;
        &row[start..end]
    }

    #[test]
    fn rows_follow_the_longer_side() {
        let entity = DealEntity {
            index: 7,
            deal: Deal {
                acceptor: PublicKey([9; 32]),
                offered: side(5, &["GOLD"]),
                requested: side(42, &["A", "B", "C"]),
            },
        };
        let rows = deal_rows(&entity);
        assert_eq!(rows.len(), 3);

        assert!(rows[0].starts_with("7 "));
        assert!(rows[0].contains(&PublicKey([9; 32]).to_identity()));
        assert!(rows[0].contains("GOLD"));
        assert!(rows[0].contains(" 42 |"));
        for row in &rows[1..] {
            assert!(offered_cells(row).chars().all(|c| c == ' ' || c == '|'));
            assert!(!row.contains(&PublicKey([9; 32]).to_identity()));
        }
        assert!(rows[2].ends_with("30"));
    }

    #[test]
    fn qu_only_deal_still_renders() {
        let entity = DealEntity {
            index: 1,
            deal: Deal {
                offered: DealSide::new(500),
                ..Default::default()
            },
        };
        let rows = deal_rows(&entity);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains(" 500 |"));
    }

    #[test]
    fn table_lines_end_with_rule_per_deal() {
        let entity = DealEntity {
            index: 2,
            deal: Deal {
                offered: side(1, &["A", "B"]),
                ..Default::default()
            },
        };
        let table = render_table(DealList::Owned, &[entity, entity]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "OWNED DEALS");
        assert_eq!(lines[1], table_header());
        assert_eq!(lines.len(), 2 + 2 * 3);
        assert_eq!(lines[4], "-".repeat(RULE_WIDTH));
        assert!(table.ends_with(&format!("{}\n", "-".repeat(RULE_WIDTH))));
    }

    #[test]
    fn empty_listing_renders_headers_only() {
        let listing = DealListing::default();
        for list in [DealList::Owned, DealList::Proposed, DealList::Opened] {
            let table = render_table(list, listing.list(list));
            assert_eq!(table.lines().count(), 2);
        }

        let text = render_listing(&listing);
        assert!(text.contains("owned deals: 0"));
        assert!(text.contains("opened deals: 0"));
        assert!(!text.contains(&"-".repeat(RULE_WIDTH)));
    }
}

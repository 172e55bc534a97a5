//! CSV export of scanned-card records.

use crate::error::StorageResult;
use crate::models::ScannedCard;
use std::io::Write;

const HEADER: &str = "id,name,ocr_name_raw,price,cmc,color_identity,type_line,sorted_direction,scanned_at";

/// Write the given cards as CSV.
///
/// Fields containing commas, quotes, or newlines are quoted per RFC 4180;
/// absent optional fields are written empty.
///
/// # Errors
/// Propagates writer I/O failures.
pub fn write_csv<W: Write>(cards: &[ScannedCard], mut writer: W) -> StorageResult<()> {
    writeln!(writer, "{}", HEADER)?;

    for card in cards {
        let fields = [
            card.id.to_string(),
            card.name.clone().unwrap_or_default(),
            card.ocr_name_raw.clone().unwrap_or_default(),
            card.price.map(|p| p.to_string()).unwrap_or_default(),
            card.cmc.map(|c| c.to_string()).unwrap_or_default(),
            card.color_identity.clone().unwrap_or_default(),
            card.type_line.clone().unwrap_or_default(),
            card.sorted_direction.clone(),
            card.scanned_at.to_rfc3339(),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        writeln!(writer, "{}", line.join(","))?;
    }

    Ok(())
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsort_core::SortDirection;

    #[test]
    fn test_export_header_only_for_empty_list() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,name,"));
    }

    #[test]
    fn test_export_writes_one_line_per_card() {
        let cards = vec![
            ScannedCard::new(Some("Sol Ring".to_string()), SortDirection::Right)
                .with_price(1.5)
                .with_color_identity("C"),
            ScannedCard::new(None, SortDirection::Left).with_ocr_raw("???"),
        ];

        let mut out = Vec::new();
        write_csv(&cards, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Sol Ring"));
        assert!(lines[1].contains("right"));
        assert!(lines[2].contains("left"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let cards = vec![
            ScannedCard::new(Some("Borrowing 100,000 Arrows".to_string()), SortDirection::Right),
        ];

        let mut out = Vec::new();
        write_csv(&cards, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"Borrowing 100,000 Arrows\""));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("plain"), "plain");
    }
}

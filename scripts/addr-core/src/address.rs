//! Canonical address assembly and decomposition.

use crate::config::AddressColumns;
use crate::normalize::{
    normalize_apartment, normalize_city, normalize_state, normalize_street_name,
    normalize_street_number, normalize_zip,
};
use crate::table::Table;
use anyhow::Result;

/// Normalized components of one record, ready for assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub street_number: String,
    pub street_name: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressParts {
    pub fn from_raw(
        street_number: &str,
        street_name: &str,
        apartment: &str,
        city: &str,
        state: &str,
        zip: &str,
    ) -> Self {
        Self {
            street_number: normalize_street_number(street_number),
            street_name: normalize_street_name(street_name),
            apartment: normalize_apartment(apartment),
            city: normalize_city(city),
            state: normalize_state(state),
            zip: normalize_zip(zip),
        }
    }
}

/// Build the canonical address string
/// `"{number} {name}, {apt}, {city}, {state} {zip}"`, collapsing segments
/// left empty by normalization and trimming stray commas and spaces at both
/// ends.
pub fn assemble(parts: &AddressParts) -> String {
    let mut address = format!(
        "{} {}, {}, {}, {} {}",
        parts.street_number, parts.street_name, parts.apartment, parts.city, parts.state, parts.zip
    );
    // Adjacent empty segments need repeated collapsing.
    while address.contains(", ,") {
        address = address.replace(", ,", ",");
    }
    address
        .trim_matches(|c: char| c == ',' || c == ' ')
        .to_string()
}

/// Drop the apartment segment of a canonical address, keeping only the
/// street and city segments. A full canonical address has four segments
/// (street, apartment, city, "state zip"); with no apartment the city is
/// already the second segment. Addresses with fewer than two segments pass
/// through unchanged.
pub fn strip_apartment(address: &str) -> String {
    let mut parts: Vec<&str> = address.split(',').collect();
    if parts.len() < 2 {
        return address.to_string();
    }
    if parts.len() > 3 {
        parts.remove(1);
    }
    parts[..2].join(",")
}

/// Split a matchable address into (street number, street name, city). Fails
/// soft: anything that does not decompose yields three empty strings.
pub fn extract_components(address: &str) -> (String, String, String) {
    let mut segments = address.split(',');
    let street_part = segments.next().unwrap_or("").trim();
    let tokens: Vec<&str> = street_part.split_whitespace().collect();
    let first = match tokens.first() {
        Some(token) => *token,
        None => return (String::new(), String::new(), String::new()),
    };
    let city = segments.next().map(str::trim).unwrap_or("").to_string();
    if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        (first.to_string(), tokens[1..].join(" "), city)
    } else {
        (String::new(), street_part.to_string(), city)
    }
}

/// Normalize the configured raw columns of every row and append the
/// assembled canonical address as a new column. Fails before touching any
/// row if a required column is absent.
pub fn add_address_column(
    table: &mut Table,
    columns: &AddressColumns,
    address_column: &str,
) -> Result<()> {
    let number_idx = table.require_column(&columns.street_number)?;
    let name_idx = table.require_column(&columns.street_name)?;
    let apartment_idx = table.require_column(&columns.apartment)?;
    let city_idx = table.require_column(&columns.city)?;
    let state_idx = table.require_column(&columns.state)?;
    let zip_idx = table.require_column(&columns.zip)?;

    let addresses: Vec<String> = (0..table.row_count())
        .map(|row| {
            let parts = AddressParts::from_raw(
                table.value(row, number_idx),
                table.value(row, name_idx),
                table.value(row, apartment_idx),
                table.value(row, city_idx),
                table.value(row, state_idx),
                table.value(row, zip_idx),
            );
            assemble(&parts)
        })
        .collect();
    table.push_column(address_column, addresses);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(number: &str, name: &str, apt: &str, city: &str, state: &str, zip: &str) -> AddressParts {
        AddressParts {
            street_number: number.into(),
            street_name: name.into(),
            apartment: apt.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    #[test]
    fn assemble_full_address() {
        let full = parts("12", "Main Street", "Apt 3", "Boston", "MA", "02118");
        assert_eq!(assemble(&full), "12 Main Street, Apt 3, Boston, MA 02118");
    }

    #[test]
    fn assemble_collapses_empty_segments() {
        let no_apt = parts("12", "Main Street", "", "Boston", "MA", "02118");
        assert_eq!(assemble(&no_apt), "12 Main Street, Boston, MA 02118");

        let no_apt_no_city = parts("12", "Main Street", "", "", "MA", "02118");
        assert_eq!(assemble(&no_apt_no_city), "12 Main Street, MA 02118");

        let empty = parts("", "", "", "", "", "");
        assert_eq!(assemble(&empty), "");
    }

    #[test]
    fn assemble_trims_dangling_separators() {
        let tail_only = parts("", "Main Street", "", "", "", "");
        assert_eq!(assemble(&tail_only), "Main Street");

        let city_only = parts("", "", "", "Boston", "", "");
        assert_eq!(assemble(&city_only), "Boston");
    }

    #[test]
    fn strip_apartment_keeps_street_and_city() {
        assert_eq!(
            strip_apartment("12 Main Street, Apt 3, Boston, MA 02118"),
            "12 Main Street, Boston"
        );
        assert_eq!(
            strip_apartment("12 Main Street, Boston, MA 02118"),
            "12 Main Street, Boston"
        );
        assert_eq!(strip_apartment("12 Main Street"), "12 Main Street");
        assert_eq!(strip_apartment(""), "");
    }

    #[test]
    fn extract_splits_number_name_city() {
        assert_eq!(
            extract_components("12 Main Street, Boston"),
            ("12".into(), "Main Street".into(), "Boston".into())
        );
        assert_eq!(
            extract_components("Main Street, Boston"),
            ("".into(), "Main Street".into(), "Boston".into())
        );
        assert_eq!(
            extract_components("12 Main Street"),
            ("12".into(), "Main Street".into(), "".into())
        );
    }

    #[test]
    fn extract_fails_soft() {
        assert_eq!(extract_components(""), ("".into(), "".into(), "".into()));
        assert_eq!(
            extract_components(", Boston"),
            ("".into(), "".into(), "".into())
        );
    }
}

//! CSV encoding of tables.
//!
//! Rows are written in input order under the table's fixed header line, so
//! identical rows always produce identical bytes and an empty table still
//! carries its columns.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::TableColumns;
use crate::error::Result;

pub fn encode_table<T: Serialize + TableColumns>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::error::PipelineError::Io(e.into_error()))
}

pub fn decode_table<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Host, Listing, ListingWithHost, RawHost, RawListing};
    use chrono::NaiveDate;

    /// Header the serde-driven writer derives from the struct fields
    fn derived_header<T: Serialize>(row: &T) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(row).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        text.lines().next().unwrap().to_string()
    }

    fn sample_listing() -> Listing {
        Listing {
            listing_id: 1,
            listing_name: None,
            room_type: "Private room".to_string(),
            minimum_nights: 1,
            host_id: Some(1),
            price: None,
            created_at: None,
            updated_at: None,
            hour_partition: None,
        }
    }

    #[test]
    fn test_decodes_raw_hosts_with_null_name() {
        let csv = "id,name,is_superhost,created_at,updated_at\n\
                   1,Ana,t,03-11-21 14:05,15-01-22 09:30\n\
                   2,,f,04-11-21 08:00,\n";
        let hosts: Vec<RawHost> = decode_table(csv.as_bytes()).unwrap();

        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].name.as_deref(), Some("Ana"));
        assert_eq!(hosts[1].name, None);
        assert_eq!(hosts[1].updated_at, None);
    }

    #[test]
    fn test_decodes_raw_listings_and_ignores_extra_columns() {
        let csv = "id,listing_url,name,room_type,minimum_nights,host_id,price,created_at,updated_at\n\
                   10,http://x,\"Loft, sunny\",Private room,0,1,\"$1,200.00\",2023-01-01 10:00:00,2023-01-02 10:00:00\n";
        let listings: Vec<RawListing> = decode_table(csv.as_bytes()).unwrap();

        assert_eq!(listings[0].name.as_deref(), Some("Loft, sunny"));
        assert_eq!(listings[0].price.as_deref(), Some("$1,200.00"));
        assert_eq!(listings[0].minimum_nights, 0);
    }

    #[test]
    fn test_non_integer_id_is_a_csv_error() {
        let csv = "id,name,is_superhost,created_at,updated_at\nabc,Ana,t,,\n";
        let result: Result<Vec<RawHost>> = decode_table(csv.as_bytes());
        assert!(matches!(result, Err(crate::error::PipelineError::Csv(_))));
    }

    #[test]
    fn test_encodes_silver_hosts_with_fixed_timestamp_layout() {
        let hosts = vec![Host {
            host_id: 1,
            host_name: "Anonymous".to_string(),
            is_superhost: "f".to_string(),
            created_at: NaiveDate::from_ymd_opt(2021, 11, 3).unwrap().and_hms_opt(14, 5, 0),
            updated_at: None,
        }];

        let bytes = encode_table(&hosts).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "host_id,host_name,is_superhost,created_at,updated_at\n1,Anonymous,f,2021-11-03 14:05:00,\n"
        );
    }

    #[test]
    fn test_declared_columns_match_field_order() {
        let raw_host = RawHost {
            id: 1,
            name: None,
            is_superhost: "t".to_string(),
            created_at: None,
            updated_at: None,
        };
        let raw_listing = RawListing {
            id: 1,
            name: None,
            room_type: "Private room".to_string(),
            minimum_nights: 1,
            host_id: None,
            price: None,
            created_at: None,
            updated_at: None,
        };
        let host = Host {
            host_id: 1,
            host_name: "Ana".to_string(),
            is_superhost: "t".to_string(),
            created_at: None,
            updated_at: None,
        };
        let gold = ListingWithHost {
            listing_id: 1,
            listing_name: None,
            room_type: "Private room".to_string(),
            minimum_nights: 1,
            price: None,
            host_id: None,
            host_name: None,
            is_superhost: None,
            created_at: None,
            updated_at: None,
        };

        assert_eq!(derived_header(&raw_host), RawHost::COLUMNS.join(","));
        assert_eq!(derived_header(&raw_listing), RawListing::COLUMNS.join(","));
        assert_eq!(derived_header(&host), Host::COLUMNS.join(","));
        assert_eq!(derived_header(&sample_listing()), Listing::COLUMNS.join(","));
        assert_eq!(derived_header(&gold), ListingWithHost::COLUMNS.join(","));
    }

    #[test]
    fn test_empty_table_keeps_its_header() {
        let bytes = encode_table::<ListingWithHost>(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            "listing_id,listing_name,room_type,minimum_nights,price,host_id,host_name,is_superhost,created_at,updated_at\n"
        );
        let decoded: Vec<ListingWithHost> = decode_table(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_fractional_seconds_survive_a_round_trip() {
        let mut listing = sample_listing();
        listing.updated_at = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_milli_opt(10, 0, 0, 750);
        listing.created_at = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(10, 0, 0);

        let bytes = encode_table(&[listing.clone()]).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains(",2023-01-01 10:00:00,2023-01-01 10:00:00.750,"));

        let decoded: Vec<Listing> = decode_table(&bytes).unwrap();
        assert_eq!(decoded[0], listing);
    }

    #[test]
    fn test_reading_silver_back_strips_offsets() {
        let csv = "listing_id,listing_name,room_type,minimum_nights,host_id,price,created_at,updated_at,hour_partition\n\
                   5,,Hotel room,1,,1250.5,2023-01-01 10:30:00,2023-01-01T10:00:00+02:00,2023-01-01 10:00:00\n";
        let listings: Vec<Listing> = decode_table(csv.as_bytes()).unwrap();

        assert_eq!(listings[0].price, Some(1250.5));
        assert_eq!(listings[0].host_id, None);
        assert_eq!(
            listings[0].updated_at,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(10, 0, 0)
        );
    }
}

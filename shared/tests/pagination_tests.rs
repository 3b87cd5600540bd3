use shared::{calculate_metadata, validate_filter, Filter, Metadata, Validator, BLOG_SORT_SAFE_LIST};

fn blog_filter(page: i64, page_size: i64, sort: &str) -> Filter {
    Filter {
        page,
        page_size,
        sort: sort.into(),
        sort_safe_list: BLOG_SORT_SAFE_LIST.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn every_safe_key_yields_a_bare_column() {
    for key in BLOG_SORT_SAFE_LIST {
        let f = blog_filter(1, 20, key);
        let mut v = Validator::new();
        validate_filter(&mut v, &f);
        assert!(v.valid(), "{key} should be accepted");

        let column = f.sort_column();
        assert!(!column.starts_with('-'));
        assert_eq!(column, key.trim_start_matches('-'));
    }
}

#[test]
fn unknown_keys_are_rejected_before_sql_derivation() {
    for key in ["version", "title DESC", "-", "id;--", "Title"] {
        let mut v = Validator::new();
        validate_filter(&mut v, &blog_filter(1, 20, key));
        assert_eq!(v.errors().get("sort").map(String::as_str), Some("invalid sort value"));
    }
}

#[test]
fn offset_and_limit_stay_in_range_at_the_bounds() {
    for (page, page_size) in [(1, 1), (1, 100), (2, 20), (10_000_000, 100)] {
        let f = blog_filter(page, page_size, "id");
        let mut v = Validator::new();
        validate_filter(&mut v, &f);
        assert!(v.valid());

        assert_eq!(f.limit(), page_size);
        assert_eq!(f.offset(), (page - 1) * page_size);
        assert!(f.offset() >= 0);
    }
}

#[test]
fn metadata_for_a_partial_last_page() {
    assert_eq!(
        calculate_metadata(53, 2, 20),
        Metadata {
            current_page: 2,
            page_size: 20,
            first_page: 1,
            last_page: 3,
            total_records: 53,
        }
    );
}

#[test]
fn metadata_for_no_records_is_empty() {
    let metadata = calculate_metadata(0, 5, 20);
    assert_eq!(metadata, Metadata::default());
    assert_eq!(serde_json::to_value(metadata).unwrap(), serde_json::json!({}));
}

use hclang_reference::{Origin, Origins};
use hclang_syntax::Pos;
use pretty_assertions::assert_eq;

use crate::{addr, range};

#[test]
fn test_no_origins() {
    assert_eq!(Origins::default().at_pos("test.hcl", Pos::INITIAL), None);
}

#[test]
fn test_single_mismatching_origin() {
    let origins = Origins::new(vec![Origin::new(addr("blah", &[]), range("test.hcl", 1, 7, 11))]);
    assert_eq!(origins.at_pos("test.hcl", Pos::new(1, 3, 2)), None);
}

#[test]
fn test_single_matching_origin() {
    let blah = Origin::new(addr("blah", &[]), range("test.hcl", 1, 7, 11));
    let origins = Origins::new(vec![blah.clone()]);
    assert_eq!(origins.at_pos("test.hcl", Pos::new(1, 9, 8)), Some(&blah));
}

#[test]
fn test_end_of_range_is_outside() {
    let origins = Origins::new(vec![Origin::new(addr("blah", &[]), range("test.hcl", 1, 7, 11))]);
    assert_eq!(origins.at_pos("test.hcl", Pos::new(1, 12, 11)), None);
}

#[test]
fn test_multiple_origins_filtered_by_file() {
    let bar = Origin::new(addr("bar", &[]), range("test.hcl", 2, 14, 18));
    let origins = Origins::new(vec![
        Origin::new(addr("foo", &[]), range("test.hcl", 1, 7, 11)),
        Origin::new(addr("var", &[]), range("differentfile.hcl", 2, 14, 18)),
        bar.clone(),
    ]);
    assert_eq!(origins.at_pos("test.hcl", Pos::new(2, 9, 15)), Some(&bar));
    assert_eq!(
        origins.at_pos("differentfile.hcl", Pos::new(2, 9, 15)).map(|o| o.addr.to_string()),
        Some("var".to_string())
    );
}

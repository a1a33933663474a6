use crate::mem::store::BlockStore;
use crate::mem::ucm::Ucm;
use crate::sim::report::{render_json, render_text};

#[test]
fn empty_report_skips_rates_and_average() {
    let mut store = BlockStore::new(8);
    let ucm = Ucm::with_reference_config(&mut store);
    let text = render_text(&ucm.stats());

    assert!(text.contains("Total Memory Accesses:        0"));
    assert!(text.contains("Overall Hit Rate: 0.00%"));
    assert!(!text.contains("  Hit Rate:"));
    assert!(!text.contains("Average Time per Access"));
}

#[test]
fn report_lists_every_level() {
    let mut store = BlockStore::new(8);
    let mut ucm = Ucm::with_reference_config(&mut store);
    ucm.read(0).unwrap();
    ucm.read(0).unwrap();
    let text = render_text(&ucm.stats());

    assert!(text.contains("L1 Cache (2 lines, 1 cycles):"));
    assert!(text.contains("L2 Cache (4 lines, 10 cycles):"));
    assert!(text.contains("L3 Cache (8 lines, 50 cycles):"));
    // L1 saw one miss and one hit; L2 and L3 one miss each
    assert!(text.contains("  Hit Rate: 50.00%"));
    assert!(text.contains("  Hit Rate: 0.00%"));
    assert!(text.contains("Overall Hit Rate: 50.00%"));
    assert!(text.contains("Total Time (cycles): 162"));
    assert!(text.contains("Average Time per Access: 81.00 cycles"));
}

#[test]
fn report_box_is_rectangular() {
    let mut store = BlockStore::new(8);
    let mut ucm = Ucm::with_reference_config(&mut store);
    ucm.write(3, 1).unwrap();
    let text = render_text(&ucm.stats());
    let widths: Vec<usize> = text.lines().map(|line| line.chars().count()).collect();
    assert!(widths.len() > 10);
    assert!(widths.iter().all(|&w| w == widths[0]), "{:?}", widths);
}

#[test]
fn json_report_has_level_breakdown() {
    let mut store = BlockStore::new(8);
    let mut ucm = Ucm::with_reference_config(&mut store);
    ucm.read(5).unwrap();
    ucm.read(6).unwrap();
    let rendered = render_json(&ucm.stats()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(json["total_accesses"], 2);
    assert_eq!(json["total_hits"], 1);
    assert_eq!(json["levels"][0]["name"], "L1");
    assert_eq!(json["levels"][2]["misses"], 1);
    assert_eq!(json["levels"].as_array().map(Vec::len), Some(3));
}

//! Basic Table Demo
//!
//! This demo walks through the table lifecycle:
//! - Loading a commented, ragged CSV file
//! - Reading and writing elements
//! - Interpolating a value column
//! - Copying, resizing and clearing tables
//! - Grouping rows into a dictionary
//!
//! Run with: cargo run --example basic_table

use csvtable::{decode_dictionary, encode_dictionary, Result, TableRegistry};

const DRAG_TABLE: &str = "\
# mach, cd, cd_transonic
0.0, 0.30
0.8, 0.32
1.0, 0.45, 0.50
1.2, 0.40
2.0, 0.30
";

fn main() -> Result<()> {
    println!("=== csvtable Basic Demo ===\n");

    let csv_path = std::env::temp_dir().join("csvtable_demo_drag.csv");
    std::fs::write(&csv_path, DRAG_TABLE)?;

    // 1. Load
    println!("1. Loading '{}'...", csv_path.display());
    let mut registry = TableRegistry::new();
    let drag = registry.load_file(&csv_path, 0)?;
    println!(
        "   ✓ Table {}: {} rows, {} columns in the first row",
        drag,
        registry.row_count(drag)?,
        registry.col_count(drag)?
    );
    if let Some((min, max)) = registry.width_range(drag)? {
        println!("   ✓ Row widths range from {} to {}\n", min, max);
    }

    // 2. Element access
    println!("2. Reading elements...");
    println!("   cd at row 2: {}", registry.read(drag, 2, 1)?);
    match registry.read(drag, 1, 2) {
        Ok(value) => println!("   row 1 col 2: {}", value),
        Err(e) => println!("   ✓ row 1 col 2 rejected: {}", e),
    }
    println!();

    // 3. Interpolation
    println!("3. Interpolating cd over mach...");
    for mach in [-0.5, 0.4, 0.9, 1.1, 3.0] {
        let cd = registry.interpolate(drag, mach, 0, 1)?;
        println!("   mach {:>4}: cd = {:.4}", mach, cd);
    }
    println!();

    // 4. Copy, modify, resize
    println!("4. Copying and reshaping...");
    let copy = registry.copy(drag)?;
    registry.write(copy, 0, 1, 0.25)?;
    registry.resize(copy, 6, 3, 0.0)?;
    println!(
        "   ✓ Copy {} is {}x{}, original cd at row 0 still {}",
        copy,
        registry.row_count(copy)?,
        registry.col_count(copy)?,
        registry.read(drag, 0, 1)?
    );

    let mut out = Vec::new();
    registry.save(copy, &mut out)?;
    print!("{}", String::from_utf8_lossy(&out));
    println!();

    // 5. Clear
    println!("5. Clearing the original...");
    registry.clear(drag)?;
    println!("   ✓ Table {} now has {} rows\n", drag, registry.row_count(drag)?);

    // 6. Dictionary
    println!("6. Grouping rows by their first field...");
    let dict = decode_dictionary("1 10 11\n2 20\n1 12\n".as_bytes())?;
    let mut out = Vec::new();
    encode_dictionary(&mut out, &dict, ' ')?;
    print!("{}", String::from_utf8_lossy(&out));

    std::fs::remove_file(&csv_path)?;
    println!("\n=== Demo Complete ===");
    Ok(())
}

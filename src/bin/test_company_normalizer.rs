use ipes_registry::company::elect_canonical_name;
use ipes_registry::entity::{extract_dba, is_excluded_filer, normalize};

fn main() {
    println!("Company Normalization Test Tool");
    println!("-------------------------------");

    // Test suffix canonicalization
    println!("\nSuffix Normalization Tests:");
    let test_names = [
        "Acme, L.L.C.",
        "ACME INC",
        "Acme   Co.",
        "Acme Incorporated",
        "Acme Voice, PLLC",
        "Acme Partners L.P.",
        "Acme Holdings Corporation",
        "Acme Ltd.",
    ];

    for name in &test_names {
        let key = normalize(name);
        let stable = normalize(&key) == key;
        println!(
            "'{}' → '{}'{}",
            name,
            key,
            if stable { "" } else { " (NOT IDEMPOTENT)" }
        );
    }

    // Test DBA extraction
    println!("\nDBA Extraction Tests:");
    let dba_cases = [
        "Acme Holdings LLC d/b/a Rocket Phone",
        "Beta Telecom Inc. dba Beta Voice",
        "Gamma Networks, doing business as GammaTel",
        "Delta Voice LLC",
    ];

    for name in &dba_cases {
        let (primary, dba) = extract_dba(name);
        println!(
            "'{}' → primary '{}', dba {}",
            name,
            primary,
            dba.map(|d| format!("'{}'", d))
                .unwrap_or_else(|| "none".to_string())
        );
    }

    // Test government exclusion
    println!("\nGovernment Filer Tests:");
    let filers = [
        "Wireline Competition Bureau",
        "Federal Communications Commission",
        "U.S. Department of Justice",
        "Acme VoIP LLC",
    ];

    for name in &filers {
        println!(
            "'{}': {}",
            name,
            if is_excluded_filer(name) {
                "EXCLUDED"
            } else {
                "kept"
            }
        );
    }

    // Test canonical name election
    println!("\nCanonical Name Election:");
    let variants = ["Acme Inc", "ACME, INC.", "Acme Incorporated"];
    println!(
        "{:?} → {}",
        variants,
        elect_canonical_name(variants.iter().copied()).unwrap_or("<none>")
    );
}

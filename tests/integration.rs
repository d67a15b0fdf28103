use std::{fs, path::PathBuf, process::Command};

fn write_dataset(path: &PathBuf, rows: usize) {
    let ages = ["0-17", "18-25", "26-35", "36-45", "46-50", "51-55", "55+"];
    let cities = ["A", "B", "C"];
    let stays = ["0", "1", "2", "3", "4+"];

    let mut contents = String::from(
        "User_ID,Product_ID,Gender,Age,Occupation,City_Category,\
         Stay_In_Current_City_Years,Marital_Status,Product_Category,Purchase\n",
    );
    for i in 0..rows {
        let gender = if i % 3 == 0 { "F" } else { "M" };
        let purchase = 5000.0 + (i % 17) as f64 * 731.0 + if i % 3 == 0 { 800.0 } else { 0.0 };
        contents.push_str(&format!(
            "{},P{:05},{},{},{},{},{},{},{},{}\n",
            1_000_000 + i,
            i % 40,
            gender,
            ages[i % ages.len()],
            i % 21,
            cities[i % cities.len()],
            stays[i % stays.len()],
            i % 2,
            1 + i % 18,
            purchase,
        ));
    }
    fs::write(path, contents).expect("failed to write dataset file");
}

fn run_bin(args: &[&str]) -> String {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_emere"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );

    stdout_str.to_string()
}

#[test]
fn all_views_render() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("all_views_render");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let data_path = test_dir.join("transactions.csv");
    write_dataset(&data_path, 200);

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "confidence_levels = [ 0.90, 0.95, 0.99,]\n"
        + "\n"
        + "[clt]\n"
        + "sample_sizes = [ 10, 30, 50,]\n"
        + "repetitions = 200\n"
        + "seed = 42\n";
    fs::write(&config_path, config_contents).expect("failed to write config file");

    let data = data_path.to_str().expect("non-UTF-8 path");
    let config = config_path.to_str().expect("non-UTF-8 path");

    for section in [
        "overview",
        "quality",
        "gender",
        "age",
        "city",
        "occupation",
        "statistics",
        "recommendations",
    ] {
        let stdout = run_bin(&[
            "--data-file",
            data,
            "--config-file",
            config,
            section,
        ]);
        let report: serde_json::Value =
            serde_json::from_str(&stdout).expect("report is not valid JSON");
        assert!(report.get("section").is_some(), "{section} report has no section tag");
    }

    let stdout = run_bin(&[
        "--data-file",
        data,
        "--config-file",
        config,
        "group",
        "--by",
        "age",
        "--and",
        "gender",
    ]);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    let aggregates = report["aggregates"].as_object().expect("no aggregates");
    assert!(!aggregates.is_empty());
    let total: u64 = aggregates
        .values()
        .map(|agg| agg["count"].as_u64().expect("count is not an integer"))
        .sum();
    assert_eq!(total, 200);

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn seeded_statistics_are_deterministic() {
    let test_dir =
        PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("seeded_statistics_are_deterministic");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let data_path = test_dir.join("transactions.csv");
    write_dataset(&data_path, 120);

    let config_path = test_dir.join("config.toml");
    fs::write(
        &config_path,
        "[clt]\nsample_sizes = [ 10, 30,]\nrepetitions = 100\nseed = 7\n",
    )
    .expect("failed to write config file");

    let data = data_path.to_str().expect("non-UTF-8 path");
    let config = config_path.to_str().expect("non-UTF-8 path");

    let first = run_bin(&["--data-file", data, "--config-file", config, "statistics"]);
    let second = run_bin(&["--data-file", data, "--config-file", config, "statistics"]);
    assert_eq!(first, second);

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn missing_columns_fail_fast() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("missing_columns_fail_fast");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let data_path = test_dir.join("broken.csv");
    fs::write(&data_path, "User_ID,Gender\n1000001,F\n").expect("failed to write dataset file");

    let bin = PathBuf::from(env!("CARGO_BIN_EXE_emere"));
    let output = Command::new(bin)
        .args([
            "--data-file",
            data_path.to_str().expect("non-UTF-8 path"),
            "overview",
        ])
        .output()
        .expect("failed to execute command");

    assert!(!output.status.success());
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr_str.contains("Purchase"),
        "schema error does not name the missing column:\n{stderr_str}"
    );

    fs::remove_dir_all(&test_dir).ok();
}

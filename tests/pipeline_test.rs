mod common;

use common::{test_config, write_input, yield_body, CountingPacer, StubResponse, StubServer, TempDir};
use pvgis_enrich::services::{BaseParams, QueryPair};
use pvgis_enrich::workflow::RecordYields;
use pvgis_enrich::{App, PvgisClient, Record, RecordCtx, RecordFlow, RunStats};
use std::collections::HashMap;

/// 按 aspect 返回不同结果：
/// 30 成功、150 服务端错误、45 非 JSON、225 缺少字段，其余成功
fn pvgis_by_aspect(params: &HashMap<String, String>) -> StubResponse {
    match params.get("aspect").map(String::as_str) {
        Some("30") => StubResponse::Json(yield_body(1234.5)),
        Some("150") => StubResponse::Status(500, "Internal Server Error".to_string()),
        Some("45") => StubResponse::Json("not json".to_string()),
        Some("225") => StubResponse::Json(r#"{"outputs":{"totals":{}}}"#.to_string()),
        _ => StubResponse::Json(yield_body(500.25)),
    }
}

const ROOFS: &str = "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw,name\n\
                     7,50.0,10.0,30,150,roof a\n\
                     8,,10.0,30,150,no lat\n\
                     9,48.5,11.25,45,225,roof c\n\
                     10,47,8,abc,90,bad angle\n\
                     11,52.1,13.4,90,270,roof e\n";

#[tokio::test]
async fn test_full_run_enriches_records() {
    let server = StubServer::start(pvgis_by_aspect).await;
    let input = TempDir::new("full_in");
    let output = TempDir::new("full_out");
    write_input(input.path(), "roofs.csv", ROOFS);

    let pacer = CountingPacer::default();
    let config = test_config(&server.endpoint, input.path(), output.path());
    let app = App::with_pacing(config, Box::new(pacer.clone())).unwrap();

    let stats = app.run().await;

    // 3 条有效记录 → 6 次请求、6 次等待（含失败）
    assert_eq!(server.aspects(), vec!["30", "150", "45", "225", "90", "270"]);
    assert_eq!(pacer.calls(), 6);
    assert_eq!(pacer.failures(), 3);

    assert_eq!(
        stats,
        RunStats {
            files_found: 1,
            files_written: 1,
            files_skipped: 0,
            files_write_failed: 0,
            records: 3,
            dropped: 2,
            fetched: 3,
            missing: 3,
        }
    );

    let written = std::fs::read_to_string(output.path().join("roofs_results.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw,name,E_Y_cw,E_Y_aw",
            "7,50.0000,10.0000,30.0000,150.0000,roof a,1234.5000,",
            "9,48.5000,11.2500,45.0000,225.0000,roof c,,",
            "11,52.1000,13.4000,90.0000,270.0000,roof e,500.2500,500.2500",
        ]
    );
}

#[tokio::test]
async fn test_zero_files_writes_nothing() {
    let server = StubServer::start(pvgis_by_aspect).await;
    let input = TempDir::new("empty_in");
    let output = TempDir::new("empty_out");
    std::fs::write(input.path().join("notes.txt"), "not a table").unwrap();
    let output_dir = output.path().join("results");

    let pacer = CountingPacer::default();
    let config = test_config(&server.endpoint, input.path(), &output_dir);
    let stats = App::with_pacing(config, Box::new(pacer.clone()))
        .unwrap()
        .run()
        .await;

    assert_eq!(stats, RunStats::default());
    assert!(server.requests().is_empty());
    assert_eq!(pacer.calls(), 0);
    assert!(!output_dir.exists(), "没有输入文件时不应创建输出目录");
}

#[tokio::test]
async fn test_unreadable_input_dir_is_clean_exit() {
    let server = StubServer::start(pvgis_by_aspect).await;
    let output = TempDir::new("missing_out");
    let missing = output.path().join("does_not_exist");

    let config = test_config(&server.endpoint, &missing, output.path());
    let stats = App::with_pacing(config, Box::new(CountingPacer::default()))
        .unwrap()
        .run()
        .await;

    assert_eq!(stats.files_found, 0);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_unusable_delay_is_rejected_at_startup() {
    let input = TempDir::new("delay_in");
    let mut config = test_config("http://127.0.0.1:9/api", input.path(), input.path());
    config.request_delay_secs = 1e300;

    // 不应在构造节奏策略时 panic
    assert!(matches!(
        App::new(config),
        Err(pvgis_enrich::AppError::Config(_))
    ));
}

#[tokio::test]
async fn test_bad_sources_are_skipped() {
    let server = StubServer::start(pvgis_by_aspect).await;
    let input = TempDir::new("skip_in");
    let output = TempDir::new("skip_out");

    write_input(
        input.path(),
        "a_missing_column.csv",
        "ORIG_FID,lat,lon,azimuth_cw\n1,50,10,30\n",
    );
    write_input(
        input.path(),
        "b_good.csv",
        "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw\n1,50,10,30,150\n",
    );
    write_input(
        input.path(),
        "c_projected.csv",
        "ORIG_FID,x,y,azimuth_cw,azimuth_aw\n1,500000,5500000,30,150\n",
    );
    write_input(
        input.path(),
        "d_all_dropped.csv",
        "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw\n1,,,30,150\n",
    );

    let pacer = CountingPacer::default();
    let config = test_config(&server.endpoint, input.path(), output.path());
    let stats = App::with_pacing(config, Box::new(pacer.clone()))
        .unwrap()
        .run()
        .await;

    assert_eq!(stats.files_found, 4);
    assert_eq!(stats.files_skipped, 3);
    assert_eq!(stats.files_written, 1);
    assert_eq!(server.requests().len(), 2);
    assert_eq!(pacer.calls(), 2);

    let mut produced: Vec<String> = std::fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    produced.sort();
    assert_eq!(produced, vec!["b_good_results.csv"]);
}

#[tokio::test]
async fn test_write_failure_does_not_stop_other_files() {
    let server = StubServer::start(pvgis_by_aspect).await;
    let input = TempDir::new("wfail_in");
    let scratch = TempDir::new("wfail_out");

    // 输出"目录"其实是一个文件，无法创建
    let blocked = scratch.path().join("blocked");
    std::fs::write(&blocked, "occupied").unwrap();

    write_input(
        input.path(),
        "first.csv",
        "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw\n1,50,10,30,150\n",
    );
    write_input(
        input.path(),
        "second.csv",
        "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw\n2,51,11,90,270\n",
    );

    let config = test_config(&server.endpoint, input.path(), &blocked);
    let stats = App::with_pacing(config, Box::new(CountingPacer::default()))
        .unwrap()
        .run()
        .await;

    assert_eq!(stats.files_found, 2);
    assert_eq!(stats.files_write_failed, 2);
    assert_eq!(stats.records, 2);
    assert_eq!(server.aspects(), vec!["30", "150", "90", "270"]);
}

#[tokio::test]
async fn test_duplicate_ids_keep_rows_and_share_last_result() {
    let server = StubServer::start(pvgis_by_aspect).await;
    let input = TempDir::new("dup_in");
    let output = TempDir::new("dup_out");
    write_input(
        input.path(),
        "dups.csv",
        "ORIG_FID,lat,lon,azimuth_cw,azimuth_aw\n\
         5,50,10,30,90\n\
         5,50,10,90,270\n",
    );

    let config = test_config(&server.endpoint, input.path(), output.path());
    let stats = App::with_pacing(config, Box::new(CountingPacer::default()))
        .unwrap()
        .run()
        .await;
    assert_eq!(stats.records, 2);

    let written = std::fs::read_to_string(output.path().join("dups_results.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "5,50.0000,10.0000,30.0000,90.0000,500.2500,500.2500");
    assert_eq!(lines[2], "5,50.0000,10.0000,90.0000,270.0000,500.2500,500.2500");
}

#[tokio::test]
async fn test_record_flow_paces_after_every_fetch() {
    let server =
        StubServer::start(|_| StubResponse::Status(503, "unavailable".to_string())).await;
    let config = test_config(
        &server.endpoint,
        std::path::Path::new("."),
        std::path::Path::new("."),
    );

    let pacer = CountingPacer::default();
    let flow = RecordFlow::new(PvgisClient::new(&config).unwrap(), Box::new(pacer.clone()));

    let base = BaseParams::default();
    let record = Record {
        id: "7".to_string(),
        lat: 50.0,
        lon: 10.0,
        azimuth_cw: 30.0,
        azimuth_aw: 150.0,
        fields: Vec::new(),
    };
    let ctx = RecordCtx::new("roofs.csv".to_string(), 1, 1, "7".to_string());

    let yields = flow.run(&QueryPair::new(&base, &record), &ctx).await;

    assert_eq!(yields, RecordYields { cw: None, aw: None });
    assert_eq!(server.aspects(), vec!["30", "150"]);
    assert_eq!(pacer.calls(), 2);
    assert_eq!(pacer.failures(), 2);
}

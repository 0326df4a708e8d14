use chrono::{NaiveDate, Utc};
use doublecast::application::ingest::{ImportSummary, import_draws};
use doublecast::domain::repositories::{AppendOutcome, DrawRepository};
use doublecast::infrastructure::InMemoryDrawRepository;
use doublecast::infrastructure::chart::parser::{parse_history, parse_latest};

const CHART: &str = r#"
<html><body>
<table border="1">
  <tr><th>Date</th><th colspan="3">Mon</th><th colspan="3">Tue</th></tr>
  <tr>
    <td>25/12/2023 to 29/12/2023</td>
    <td>1<br>2<br>7</td><td class="r">06</td><td>2<br>4<br>0</td>
    <td>149</td><td>44</td><td>130</td>
    <td>280</td><td>07</td><td>250</td>
    <td>**</td><td>**</td><td>**</td>
    <td>355</td><td>38</td><td>279</td>
  </tr>
  <tr>
    <td>01/01/2024 to 07/01/2024</td>
    <td>123</td><td>61</td><td>456</td>
    <td>234</td><td>90</td><td>345</td>
    <td>389</td><td>07</td><td>124</td>
    <td>446</td><td>42</td><td>156</td>
    <td>138</td><td>23</td><td>570</td>
  </tr>
</table>
</body></html>
"#;

#[test]
fn test_latest_draw_is_range_start_plus_four() {
    let record = parse_latest(CHART, "http://chart", Utc::now()).unwrap();
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(record.double.value(), 23);
    assert_eq!(record.tens(), 2);
    assert_eq!(record.units(), 3);
    assert_eq!(record.draw_id(), "2024-01-05-23");
}

#[tokio::test]
async fn test_history_import_is_idempotent() {
    let chart = parse_history(CHART, "http://chart", Utc::now()).unwrap();
    assert_eq!(chart.records.len(), 9);
    assert_eq!(chart.skipped, 1);
    assert_eq!(chart.records[0].open3.to_string(), "127");

    let repository = InMemoryDrawRepository::new();
    for record in &chart.records {
        assert_eq!(repository.append(record).await.unwrap(), AppendOutcome::Inserted);
    }
    for record in &chart.records {
        assert_eq!(repository.append(record).await.unwrap(), AppendOutcome::Duplicate);
    }
    assert_eq!(repository.count().await.unwrap(), 9);

    let before_new_year = repository
        .find_before(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(before_new_year.len(), 4);
}

#[tokio::test]
async fn test_history_import_after_latest_draw_was_saved() {
    let repository = InMemoryDrawRepository::new();
    let latest = parse_latest(CHART, "http://chart", Utc::now()).unwrap();
    assert_eq!(repository.append(&latest).await.unwrap(), AppendOutcome::Inserted);

    let chart = parse_history(CHART, "http://chart", Utc::now()).unwrap();
    let summary = import_draws(&repository, &chart.records).await.unwrap();
    assert_eq!(
        summary,
        ImportSummary {
            imported: 0,
            duplicates: 1,
            stale: 8,
        }
    );
    assert_eq!(repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_history_import_extends_partial_history() {
    let chart = parse_history(CHART, "http://chart", Utc::now()).unwrap();
    let repository = InMemoryDrawRepository::new();
    let jan_2 = &chart.records[5];
    assert_eq!(jan_2.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    repository.append(jan_2).await.unwrap();

    let summary = import_draws(&repository, &chart.records).await.unwrap();
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.stale, 5);
    assert_eq!(summary.skipped(), 6);

    let stored = repository.find_all().await.unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored.last().unwrap().double.value(), 23);
}

//! History filtering, sorting and scope handling.

mod common;

use std::sync::Arc;

use common::{polling, registry_with, MockApi, PollStep, RecordBuilder};
use scribedesk::history::{
    HistoryFilter, HistoryRecord, HistoryScope, HistoryView, RowAction, SortDirection, SortField,
};
use scribedesk::TranscriptionApi;

fn records() -> Vec<HistoryRecord> {
    vec![
        RecordBuilder::completed("r1", "call-ana.mp3")
            .owner("Ana")
            .analysis("Procedente")
            .duration(320.0)
            .created_at("2024-03-01T09:00:00")
            .completed_at("2024-03-01T09:05:00")
            .build(),
        RecordBuilder::failed("r2", "Call-bruno.wav")
            .owner("Bruno")
            .created_at("2024-03-02T10:00:00")
            .completed_at("2024-03-02T10:01:00")
            .build(),
        RecordBuilder::completed("r3", "reuniao.mp3")
            .owner("Ana")
            .duration(1800.0)
            .created_at("2024-02-28T15:00:00")
            .completed_at("2024-02-28T15:40:00")
            .build(),
        RecordBuilder::failed("r4", "entrevista.ogg")
            .owner("Carla")
            .created_at("2024-03-02T11:00:00")
            .build(),
    ]
}

fn ids(view: &HistoryView, records: &[HistoryRecord]) -> Vec<String> {
    view.render(&[], records)
        .iter()
        .map(|row| row.id().to_string())
        .collect()
}

#[test]
fn test_filter_cases() {
    let records = records();
    let cases: Vec<(&str, HistoryFilter, HistoryScope, Vec<&str>)> = vec![
        (
            "no filter, newest completion first",
            HistoryFilter::default(),
            HistoryScope::Own,
            vec!["r2", "r1", "r3", "r4"],
        ),
        (
            "filename is case-insensitive",
            HistoryFilter::default().with_filename("CALL"),
            HistoryScope::Own,
            vec!["r2", "r1"],
        ),
        (
            "filename and failed combine",
            HistoryFilter::default()
                .with_filename("call")
                .with_status("failed"),
            HistoryScope::Own,
            vec!["r2"],
        ),
        (
            "analysis status",
            HistoryFilter::default().with_status("Procedente"),
            HistoryScope::Own,
            vec!["r1"],
        ),
        (
            "default analysis status",
            HistoryFilter::default().with_status("Pendente de análise"),
            HistoryScope::Own,
            vec!["r2", "r3", "r4"],
        ),
        (
            "date keeps records without completion",
            HistoryFilter::default().with_date("2024-03-02"),
            HistoryScope::Own,
            vec!["r2", "r4"],
        ),
        (
            "owner ignored in own scope",
            HistoryFilter::default().with_owner("ana"),
            HistoryScope::Own,
            vec!["r2", "r1", "r3", "r4"],
        ),
        (
            "owner in all scope",
            HistoryFilter::default().with_owner("ana"),
            HistoryScope::All,
            vec!["r1", "r3"],
        ),
        (
            "blank values are ignored",
            HistoryFilter::default().with_filename("  ").with_status(""),
            HistoryScope::Own,
            vec!["r2", "r1", "r3", "r4"],
        ),
    ];

    for (name, filter, scope, expected) in cases {
        let mut view = HistoryView::new(true);
        view.set_scope(scope);
        view.set_filter(filter);
        assert_eq!(ids(&view, &records), expected, "{}", name);
    }
}

#[test]
fn test_sort_cases() {
    let records = records();
    let cases: Vec<(Vec<SortField>, Vec<&str>)> = vec![
        // New field starts descending.
        (vec![SortField::Filename], vec!["r3", "r4", "r2", "r1"]),
        (
            vec![SortField::Filename, SortField::Filename],
            vec!["r1", "r2", "r4", "r3"],
        ),
        // Missing durations sort lowest.
        (
            vec![SortField::Duration, SortField::Duration],
            vec!["r2", "r4", "r1", "r3"],
        ),
        (vec![SortField::CreatedAt], vec!["r4", "r2", "r1", "r3"]),
        (
            vec![SortField::CompletedAt],
            vec!["r4", "r3", "r1", "r2"],
        ),
    ];

    for (clicks, expected) in cases {
        let mut view = HistoryView::new(false);
        for field in &clicks {
            view.toggle_sort(*field);
        }
        assert_eq!(ids(&view, &records), expected, "clicks: {:?}", clicks);
    }
}

#[test]
fn test_toggle_direction() {
    let mut view = HistoryView::new(false);
    assert_eq!(view.sort().direction, SortDirection::Desc);
    view.toggle_sort(SortField::CompletedAt);
    assert_eq!(view.sort().direction, SortDirection::Asc);
    view.toggle_sort(SortField::Owner);
    assert_eq!(view.sort().field, SortField::Owner);
    assert_eq!(view.sort().direction, SortDirection::Desc);
}

#[test]
fn test_non_privileged_scope_is_pinned() {
    let mut view = HistoryView::new(false);
    assert!(!view.set_scope(HistoryScope::All));
    assert_eq!(view.scope(), HistoryScope::Own);
    assert!(!view.owner_filter_available());
}

#[test]
fn test_switching_back_to_own_clears_owner_filter() {
    let mut view = HistoryView::new(true);
    assert!(view.set_scope(HistoryScope::All));
    assert!(view.owner_filter_available());
    view.set_filter(HistoryFilter::default().with_owner("Ana").with_filename("call"));

    assert!(view.set_scope(HistoryScope::Own));
    assert_eq!(view.filter().owner, None);
    assert_eq!(view.filter().filename.as_deref(), Some("call"));

    view.clear_filters();
    assert!(view.filter().is_empty());
}

#[test]
fn test_row_actions() {
    let records = records();
    let view = HistoryView::new(false);
    let rows = view.render(&[], &records);

    let completed = rows.iter().find(|r| r.id() == "r1").unwrap();
    assert_eq!(
        completed.actions(),
        vec![
            RowAction::Rename,
            RowAction::View,
            RowAction::Delete,
            RowAction::Download
        ]
    );
    let failed = rows.iter().find(|r| r.id() == "r2").unwrap();
    assert_eq!(failed.actions(), vec![RowAction::Delete]);
}

#[tokio::test(start_paused = true)]
async fn test_active_jobs_lead_and_ignore_filters() {
    let api = Arc::new(
        MockApi::new()
            .with_history(records())
            .with_script("live", vec![PollStep::processing(40.0)]),
    );
    let registry = registry_with(api.clone(), polling(1200, 1000));
    registry.track("live", "gravacao.mp3").unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let mut view = HistoryView::new(true);
    view.set_scope(HistoryScope::All);
    view.set_filter(HistoryFilter::default().with_status("failed"));

    let fetched = api.fetch_history(view.scope()).await.unwrap();
    assert_eq!(api.history_scopes(), vec![HistoryScope::All]);

    let rows = view.render(&registry.list(), &fetched);
    let row_ids: Vec<&str> = rows.iter().map(|r| r.id()).collect();
    assert_eq!(row_ids, vec!["live", "r2", "r4"]);
    assert_eq!(rows[0].actions(), vec![RowAction::Cancel]);
}

#[tokio::test]
async fn test_rename_and_analysis_update_round_trip() {
    let api = MockApi::new().with_history(records());

    api.rename("r1", "Ligação Ana").await.unwrap();
    api.update_analysis_status("r3", "Improcedente").await.unwrap();
    assert_eq!(
        api.renames(),
        vec![("r1".to_string(), "Ligação Ana".to_string())]
    );

    let fetched = api.fetch_history(HistoryScope::Own).await.unwrap();
    let mut view = HistoryView::new(false);
    view.set_filter(HistoryFilter::default().with_status("Improcedente"));
    assert_eq!(ids(&view, &fetched), vec!["r3"]);

    api.delete("r3").await.unwrap();
    let fetched = api.fetch_history(HistoryScope::Own).await.unwrap();
    assert!(ids(&view, &fetched).is_empty());
}

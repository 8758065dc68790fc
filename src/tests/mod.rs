use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::cms::{ClientOptions, CmsClient};
use crate::matrix::{
    budget_color, budget_utilization_percent, selected_total, toggle_selection, BudgetColor, Grid,
    MatrixAttributes, Selection, DEFAULT_UPLOAD_PREFIX,
};
use crate::output::{build_view, ViewOptions};
use crate::store::{Action, MatrixState, SelectionPolicy};

fn attrs(value: serde_json::Value) -> MatrixAttributes {
    serde_json::from_value(value).unwrap()
}

#[test]
fn dimensions_are_max_text_index() {
    let a = attrs(json!({
        "Text_1_1": "a",
        "Text_4_2": "b",
        "Text_2_7": "c",
        "Price_9_9": 5,
        "Row_Name_12": "late",
    }));
    assert_eq!(a.number_of_columns(), 4);
    assert_eq!(a.number_of_rows(), 7);

    let empty = MatrixAttributes::default();
    assert_eq!(empty.number_of_columns(), 0);
    assert_eq!(empty.number_of_rows(), 0);
}

#[test]
fn oversized_indices_are_skipped() {
    let a = attrs(json!({
        "Text_1_1": "A",
        "Text_1_4000000000": "far",
        "Row_Name_1": "first",
        "Row_Name_18446744073709551615": "x",
        "Column_Name_1000000000": "y",
    }));
    assert_eq!(a.row_names(), vec![Some("first".to_string())]);
    assert!(a.column_names().is_empty());
    assert_eq!(a.number_of_rows(), 1);

    let grid = Grid::from_attributes(&a, None);
    assert_eq!(grid.display_rows(), 1);
    assert_eq!(grid.display_columns(), 1);
    let options = ViewOptions {
        upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
        media_base_url: None,
        policy: SelectionPolicy::default(),
    };
    let view = build_view(&grid, &Selection::new(), &options);
    assert_eq!(view.rows.len(), 1);
}

#[test]
fn toggle_twice_restores_selection() {
    let base = Selection::new().toggle(2, 1);
    let once = toggle_selection(&base, 2, 3);
    assert_eq!(once.row_for(2), Some(3));
    assert_eq!(toggle_selection(&toggle_selection(&base, 0, 0), 0, 0), base);
    assert_eq!(toggle_selection(&toggle_selection(&base, 2, 1), 2, 1), base);
}

#[test]
fn selected_total_is_additive_and_order_independent() {
    let a = attrs(json!({
        "Price_1_1": 10, "Price_2_1": 20, "Price_3_2": 35.5, "Price_4_1": 1,
    }));
    let left: Selection = [(0, 0), (1, 0)].into_iter().collect();
    let right: Selection = [(2, 1), (3, 0)].into_iter().collect();
    let both: Selection = [(3, 0), (2, 1), (1, 0), (0, 0)].into_iter().collect();
    let both_other_order = Selection::new()
        .toggle(2, 1)
        .toggle(0, 0)
        .toggle(3, 0)
        .toggle(1, 0);
    assert_eq!(
        selected_total(&a, &both),
        selected_total(&a, &left) + selected_total(&a, &right)
    );
    assert_eq!(selected_total(&a, &both), selected_total(&a, &both_other_order));
    assert_eq!(selected_total(&a, &both), 66.5);
}

#[test]
fn budget_color_boundaries() {
    assert_eq!(budget_color(80.0), BudgetColor::Green);
    assert_eq!(budget_color(80.1), BudgetColor::Yellow);
    assert_eq!(budget_color(95.0), BudgetColor::Yellow);
    assert_eq!(budget_color(95.1), BudgetColor::Red);
}

#[test]
fn single_selection_example() {
    let a = attrs(json!({ "Text_1_1": "A", "Price_1_1": 100, "Total_Price": 200 }));
    let sel = Selection::new().toggle(0, 0);
    let total = selected_total(&a, &sel);
    assert_eq!(total, 100.0);
    let percent = budget_utilization_percent(total, a.total_price()).unwrap();
    assert_eq!(percent, 50.0);
    assert_eq!(budget_color(percent), BudgetColor::Green);
}

#[test]
fn two_columns_at_ninety_five_percent_is_yellow() {
    let a = attrs(json!({
        "Text_1_1": "A", "Price_1_1": 100,
        "Text_2_2": "B", "Price_2_2": 90,
        "Total_Price": 200,
    }));
    let sel = Selection::new().toggle(0, 0).toggle(1, 1);
    let percent = budget_utilization_percent(selected_total(&a, &sel), 200.0).unwrap();
    assert_eq!(percent, 95.0);
    assert_eq!(budget_color(percent), BudgetColor::Yellow);
}

#[test]
fn names_land_at_declared_positions_regardless_of_key_order() {
    let forward = attrs(json!({
        "Row_Name_1": "S", "Row_Name_2": "M", "Row_Name_3": "L",
        "Column_Name_1": "Base", "Column_Name_2": "Trim",
    }));
    let reversed = attrs(json!({
        "Column_Name_2": "Trim", "Column_Name_1": "Base",
        "Row_Name_3": "L", "Row_Name_2": "M", "Row_Name_1": "S",
    }));
    let expected_rows = vec![
        Some("S".to_string()),
        Some("M".to_string()),
        Some("L".to_string()),
    ];
    assert_eq!(forward.row_names(), expected_rows);
    assert_eq!(reversed.row_names(), expected_rows);
    assert_eq!(forward.column_names(), reversed.column_names());
    assert_eq!(
        reversed.column_names(),
        vec![Some("Base".to_string()), Some("Trim".to_string())]
    );
}

async fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}/api/matrices?populate=*")
}

fn client(api_url: String) -> CmsClient {
    CmsClient::new(ClientOptions {
        api_url,
        timeout_seconds: 5,
        proxy: None,
    })
    .unwrap()
}

#[tokio::test]
async fn fetch_decodes_collection() {
    let body = json!({
        "data": [
            { "id": 1, "attributes": { "Title_Matrix": "Kitchen", "Total_Price": 500, "Text_1_1": "Oak", "Price_1_1": 120 } },
            { "id": 2, "attributes": { "Title_Matrix": "Bath", "Total_Price": 300 } }
        ],
        "meta": { "pagination": { "page": 1 } }
    })
    .to_string();
    let url = serve_once("HTTP/1.1 200 OK", body).await;
    let records = client(url).fetch_matrices().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title(), "Kitchen");
    assert_eq!(records[0].attributes.cell_price(1, 1), 120.0);
}

#[tokio::test]
async fn non_success_status_is_fetch_failed() {
    let url = serve_once("HTTP/1.1 500 Internal Server Error", "{}".to_string()).await;
    let err = client(url.clone()).fetch_matrices().await.unwrap_err();
    assert_eq!(err.url, url);
    assert!(err.reason.contains("500"));
}

#[tokio::test]
async fn store_sync_keeps_empty_snapshot_on_failure() {
    let url = serve_once("HTTP/1.1 200 OK", "not json".to_string()).await;
    let state = MatrixState::new(None, SelectionPolicy::default(), None)
        .sync(&client(url))
        .await;
    assert!(state.last_error().is_some());
    assert!(state.snapshot().is_none());
    assert!(!state.needs_fetch());
}

#[tokio::test]
async fn store_sync_loads_and_navigation_triggers_refetch() {
    let body = json!({
        "data": [
            { "id": 1, "attributes": { "Title_Matrix": "Kitchen", "Text_1_1": "Oak" } },
            { "id": 2, "attributes": { "Title_Matrix": "Bath", "Text_1_1": "Tile" } }
        ]
    })
    .to_string();
    let url = serve_once("HTTP/1.1 200 OK", body).await;
    let state = MatrixState::new(Some("Bath".to_string()), SelectionPolicy::default(), None)
        .sync(&client(url))
        .await;
    assert_eq!(state.grid().unwrap().title, "Bath");
    assert_eq!(state.grid().unwrap().cell_text(0, 0), "Tile");

    let state = state.reduce(Action::Navigate(Some("Kitchen".to_string())));
    assert!(state.needs_fetch());
    // The prior snapshot stays until the new fetch lands.
    assert_eq!(state.grid().unwrap().title, "Bath");
}

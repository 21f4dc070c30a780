use std::path::Path;
use tempfile::TempDir;
use vacancy_harvest::config::Config;
use vacancy_harvest::output::{NULL_SENTINEL, OUTPUT_FIELDS};
use vacancy_harvest::places::PlaceDirectory;
use vacancy_harvest::Coordinator;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration tuned for fast tests
fn create_test_config(output: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.max_concurrent_downloads = 4;
    config.crawler.page_pause_ms = 0;
    config.retry.delay_ms = 10;
    config.retry.max_delay_ms = 10;
    config.output.path = output.to_string_lossy().into_owned();
    config
}

fn places_for(base_url: &str) -> PlaceDirectory {
    PlaceDirectory::from_json(&format!(
        r#"{{ "Пермь": {{ "region": "Пермский край", "url": "{}" }} }}"#,
        base_url
    ))
    .expect("Failed to build places")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn listing_page(counter: &str, ids: std::ops::Range<u32>) -> String {
    let ads: String = ids
        .map(|id| {
            format!(
                r#"<div class="v_box"><div class="v_name"><a href="/vakansii/{id}.html">Вакансия {id}</a></div></div>"#
            )
        })
        .collect();
    format!(
        r#"<div class="cnt_line"><span class="tit">Найдено {} вакансий</span></div>{}"#,
        counter, ads
    )
}

fn ad_page(id: u32) -> String {
    format!(
        r#"<h1 class="vid_tit">Вакансия {id}</h1>
           <div class="card_ogz">
               <div>Компания: Компания {id}</div>
               <div>Опыт работы: без опыта</div>
               <div>График работы: полный день</div>
               <div>Занятость: полная</div>
           </div>
           <div class="card_adr">Адрес: ул. Ленина, {id}</div>
           <div class="otklik"><a href="/otklik/{id}/">Откликнуться</a></div>"#
    )
}

fn contacts_page(id: u32) -> String {
    format!(
        r#"<div class="card_contact">Контактное лицо: Менеджер {id}<br>Телефон: +7 342 000-00-{id:02}<br>E-mail: hr{id}@example.ru</div>"#
    )
}

/// Mounts a board with `total` ads, 10 per listing page
async fn mount_board(server: &MockServer, total: u32) {
    let pages = total / 10 + 1;
    for page in 1..=pages {
        let first = (page - 1) * 10 + 1;
        let last = (page * 10).min(total);
        Mock::given(method("GET"))
            .and(path("/vakansii/"))
            .and(query_param("p", page.to_string()))
            .respond_with(html(&listing_page(&total.to_string(), first..last + 1)))
            .mount(server)
            .await;
    }

    for id in 1..=total {
        Mock::given(method("GET"))
            .and(path(format!("/vakansii/{}.html", id)))
            .respond_with(html(&ad_page(id)))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/otklik/{}/", id)))
            .respond_with(html(&contacts_page(id)))
            .mount(server)
            .await;
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open output");
    reader
        .records()
        .map(|r| {
            r.expect("Malformed row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

fn column(name: &str) -> usize {
    OUTPUT_FIELDS
        .iter()
        .position(|f| *f == name)
        .expect("Unknown column")
}

#[tokio::test]
async fn test_full_harvest_of_three_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_board(&mock_server, 25).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("perm.csv");
    let config = create_test_config(&output);

    let coordinator =
        Coordinator::from_config(&config, places_for(&base_url)).expect("Failed to build coordinator");
    let summary = coordinator
        .site_parse(&format!("{}/", base_url), &output, "utf8")
        .await
        .expect("Harvest failed");

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.records, 25);

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 26, "header plus one row per advertisement");
    assert_eq!(rows[0], OUTPUT_FIELDS);

    let mut links: Vec<&String> = Vec::new();
    for row in &rows[1..] {
        assert_eq!(row.len(), OUTPUT_FIELDS.len());
        assert_eq!(row[column("Город")], "Пермь");
        assert_eq!(row[column("Регион")], "Пермский край");

        let link = &row[column("Ссылка")];
        let id: u32 = link
            .trim_start_matches(&format!("{}/vakansii/", base_url))
            .trim_end_matches(".html")
            .parse()
            .expect("Unexpected link");

        assert_eq!(row[column("Вакансия")], format!("Вакансия {}", id));
        assert_eq!(row[column("Компания")], format!("Компания {}", id));
        assert_eq!(row[column("Адрес")], format!("ул. Ленина, {}", id));
        assert_eq!(row[column("E-mail")], format!("hr{}@example.ru", id));
        assert_eq!(row[column("Телефон")], format!("+7 342 000-00-{:02}", id));

        assert!(row.iter().all(|value| value != NULL_SENTINEL));
        assert!(row.iter().all(|value| !value.contains("/otklik/")));
        links.push(link);
    }

    links.sort();
    links.dedup();
    assert_eq!(links.len(), 25);
}

#[tokio::test]
async fn test_rows_follow_page_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_board(&mock_server, 25).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("ordered.csv");
    let config = create_test_config(&output);

    let coordinator =
        Coordinator::from_config(&config, places_for(&base_url)).expect("Failed to build coordinator");
    coordinator
        .site_parse(&base_url, &output, "utf8")
        .await
        .expect("Harvest failed");

    let titles: Vec<String> = read_rows(&output)[1..]
        .iter()
        .map(|row| row[column("Вакансия")].clone())
        .collect();
    let expected: Vec<String> = (1..=25).map(|id| format!("Вакансия {}", id)).collect();
    assert_eq!(titles, expected);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // First two requests for the listing fail, mounted ahead of the board
    Mock::given(method("GET"))
        .and(path("/vakansii/"))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/otklik/3/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    mount_board(&mock_server, 5).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("retry.csv");
    let config = create_test_config(&output);

    let coordinator =
        Coordinator::from_config(&config, places_for(&base_url)).expect("Failed to build coordinator");
    let summary = coordinator
        .site_parse(&base_url, &output, "utf8")
        .await
        .expect("Harvest failed");

    assert_eq!(summary.records, 5);

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording disabled");
    let listing_requests = requests
        .iter()
        .filter(|r| r.url.path() == "/vakansii/" && r.url.query() == Some("p=1"))
        .count();
    let contact_requests = requests
        .iter()
        .filter(|r| r.url.path() == "/otklik/3/")
        .count();
    assert_eq!(listing_requests, 3);
    assert_eq!(contact_requests, 2);

    let rows = read_rows(&output);
    let row = rows
        .iter()
        .find(|row| row[column("Вакансия")] == "Вакансия 3")
        .expect("Missing record 3");
    assert_eq!(row[column("E-mail")], "hr3@example.ru");
}

#[tokio::test]
async fn test_second_run_appends_without_new_header() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_board(&mock_server, 3).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("appended.csv");
    let config = create_test_config(&output);
    let coordinator =
        Coordinator::from_config(&config, places_for(&base_url)).expect("Failed to build coordinator");

    let targets = vec![base_url.clone(), base_url.clone()];
    let summaries = coordinator
        .run(&targets, &output, "utf8")
        .await
        .expect("Harvest failed");

    assert_eq!(summaries.len(), 2);

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 1 + 3 + 3);
    let headers = rows
        .iter()
        .filter(|row| row[0] == OUTPUT_FIELDS[0])
        .count();
    assert_eq!(headers, 1);
}

#[tokio::test]
async fn test_missing_counter_processes_first_page_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/vakansii/"))
        .and(query_param("p", "1"))
        .respond_with(html(
            r#"<div class="v_box"><div class="v_name"><a href="/vakansii/1.html">1</a></div></div>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vakansii/1.html"))
        .respond_with(html(&ad_page(1)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/otklik/1/"))
        .respond_with(html(&contacts_page(1)))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("single.csv");
    let config = create_test_config(&output);

    let coordinator =
        Coordinator::from_config(&config, PlaceDirectory::default()).expect("Failed to build coordinator");
    let summary = coordinator
        .site_parse(&base_url, &output, "utf8")
        .await
        .expect("Harvest failed");

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.records, 1);

    let rows = read_rows(&output);
    assert_eq!(rows[1][column("Город")], NULL_SENTINEL);
    assert_eq!(rows[1][column("Регион")], NULL_SENTINEL);
}

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::json;

mod common;
use common::{TestApp, create_department, create_employee, get, setup_test_app};

async fn hire(app: &TestApp, department: i64, email: &str, name: &str, salary: &str, dob: &str) {
    let (status, body) = create_employee(
        app,
        department,
        email,
        &[("name", name), ("salary", salary), ("dob", dob)],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

fn age(dob: &str) -> u32 {
    let dob = NaiveDate::parse_from_str(dob, "%Y-%m-%d").unwrap();
    staff_registry::statistics::age_on(dob, chrono::Local::now().date_naive())
}

#[tokio::test]
async fn test_statistics_scenario() {
    let app = setup_test_app().await;
    let eng = create_department(&app, "Eng").await;
    let sales = create_department(&app, "Sales").await;
    hire(&app, eng, "a@example.com", "Avery", "60000", "1990-01-01").await;
    hire(&app, eng, "b@example.com", "Blake", "40000", "1995-06-15").await;
    hire(&app, sales, "c@example.com", "Casey", "120000", "1988-03-10").await;

    let (status, body) = get(&app, "/api/employees/stats").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Employee statistics fetched successfully");

    let data = &body["data"];
    assert_eq!(
        data["departmentHighestSalary"],
        json!([
            {"department": "Sales", "salary": 120000.0},
            {"department": "Eng", "salary": 60000.0}
        ])
    );
    assert_eq!(
        data["salaryRangeCount"],
        json!([
            {"range": "0-50000", "count": 1},
            {"range": "50001-100000", "count": 1},
            {"range": "100000+", "count": 1}
        ])
    );
    assert_eq!(
        data["youngestByDepartment"],
        json!([
            {"department": "Eng", "name": "Blake", "age": age("1995-06-15")},
            {"department": "Sales", "name": "Casey", "age": age("1988-03-10")}
        ])
    );
}

#[tokio::test]
async fn test_statistics_boundaries_and_empty_departments() {
    let app = setup_test_app().await;
    let zeta = create_department(&app, "Zeta").await;
    let alpha = create_department(&app, "Alpha").await;
    let _empty = create_department(&app, "Empty").await;
    hire(&app, alpha, "a@example.com", "Exactly Fifty", "50000", "1991-02-02").await;
    hire(&app, alpha, "b@example.com", "Exactly Hundred", "100000", "1991-02-02").await;
    hire(&app, zeta, "c@example.com", "Just Over", "100001", "2000-07-07").await;

    let (_, body) = get(&app, "/api/employees/stats").await;
    let data = &body["data"];

    assert_eq!(
        data["salaryRangeCount"],
        json!([
            {"range": "0-50000", "count": 1},
            {"range": "50001-100000", "count": 1},
            {"range": "100000+", "count": 1}
        ])
    );

    let highest = data["departmentHighestSalary"].as_array().unwrap();
    assert_eq!(highest.len(), 3);
    assert_eq!(highest[0], json!({"department": "Zeta", "salary": 100001.0}));
    assert_eq!(highest[1], json!({"department": "Alpha", "salary": 100000.0}));
    assert_eq!(highest[2], json!({"department": "Empty", "salary": null}));

    let youngest = data["youngestByDepartment"].as_array().unwrap();
    let departments: Vec<&str> = youngest
        .iter()
        .map(|row| row["department"].as_str().unwrap())
        .collect();
    assert_eq!(departments, ["Alpha", "Empty", "Zeta"]);
    // Same birthday: the earlier hire wins.
    assert_eq!(youngest[0]["name"], "Exactly Fifty");
    assert_eq!(youngest[1], json!({"department": "Empty", "name": null, "age": null}));
}

#[tokio::test]
async fn test_statistics_without_data() {
    let app = setup_test_app().await;

    let (status, body) = get(&app, "/api/employees/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "departmentHighestSalary": [],
            "salaryRangeCount": [],
            "youngestByDepartment": []
        })
    );
}

#[tokio::test]
async fn test_statistics_service_with_fixed_date() {
    use rust_decimal::Decimal;
    use staff_registry::entities::Status;
    use staff_registry::services::{department, employee};
    use staff_registry::statistics::employee_stats;

    let db = common::setup_test_db().await.unwrap();
    let photos = common::MemoryPhotoStore::default();
    let eng = department::create(
        &db,
        department::NewDepartment {
            name: "Eng".into(),
            status: Status::Active,
        },
    )
    .await
    .unwrap();

    let new = employee::NewEmployee {
        department_id: eng.id,
        name: "Blake".into(),
        dob: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
        phone: "+15550001111".into(),
        email: "blake@example.com".into(),
        salary: Decimal::from(40_000),
        status: Status::Active,
    };
    employee::create(&db, &photos, new, None).await.unwrap();

    let before_birthday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
    let stats = employee_stats(&db, before_birthday).await.unwrap();
    assert_eq!(stats.youngest_by_department[0].age, Some(29));

    let on_birthday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let stats = employee_stats(&db, on_birthday).await.unwrap();
    assert_eq!(stats.youngest_by_department[0].age, Some(30));
    assert_eq!(stats.department_highest_salary[0].salary, Some(Decimal::from(40_000)));
    assert_eq!(stats.salary_range_count[0].salary_range, "0-50000");
}

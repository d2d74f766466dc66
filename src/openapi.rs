use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staff Registry",
        description = "Employee and department records with filtered pagination and salary statistics."
    ),
    tags(
        (name = "departments", description = "Departments and their employee counts"),
        (name = "employees", description = "Employees, photos and statistics")
    )
)]
pub struct ApiDoc;

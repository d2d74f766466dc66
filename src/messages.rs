//! User-facing messages carried in the response envelope.

pub mod employees {
    pub const FETCHED: &str = "Employees fetched successfully";
    pub const FETCHED_ONE: &str = "Employee fetched successfully";
    pub const CREATED: &str = "Employee created successfully";
    pub const UPDATED: &str = "Employee updated successfully";
    pub const DELETED: &str = "Employee deleted successfully";
    pub const STATS: &str = "Employee statistics fetched successfully";

    pub const INVALID_ID: &str = "Invalid employee ID";
    pub const EMAIL_TAKEN: &str = "Email already exists";
    pub const STATS_FAILED: &str = "Failed to fetch employee statistics";
}

pub mod departments {
    pub const FETCHED: &str = "Departments fetched successfully";
    pub const FETCHED_ONE: &str = "Department fetched successfully";
    pub const CREATED: &str = "Department created successfully";
    pub const UPDATED: &str = "Department updated successfully";
    pub const DELETED: &str = "Department deleted successfully";

    pub const INVALID_ID: &str = "Invalid department ID";
    pub const INVALID: &str = "Invalid department";
}

pub const NOTHING_TO_UPDATE: &str = "No fields to update";
pub const DATABASE_ERROR: &str = "A database error occurred";
pub const PHOTO_STORE_FAILED: &str = "Failed to store photo";
pub const ONLY_IMAGES: &str = "Only image files are allowed!";
pub const FILE_TOO_LARGE: &str = "File too large";

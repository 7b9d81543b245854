//! Course browsing, enrollment, and teacher course/material management.

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use super::types::{Course, CourseMaterial, Enrollment};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// All courses visible to the caller. The backend scopes this list for
    /// teachers to their own courses.
    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get_json("courses/courses/").await
    }

    pub async fn course_detail(&self, course_id: i64) -> Result<Course, ApiError> {
        self.get_json(&format!("courses/courses/{course_id}/")).await
    }

    /// Courses taught by `username`, filtered client-side.
    pub async fn teacher_courses(&self, username: &str) -> Result<Vec<Course>, ApiError> {
        let courses = self.courses().await?;
        Ok(filter_by_teacher(courses, username))
    }

    pub async fn enroll(&self, course_id: i64) -> Result<Enrollment, ApiError> {
        self.send_json(Method::POST, "courses/enrollments/", &json!({ "course": course_id }))
            .await
    }

    pub async fn enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        self.get_json("courses/enrollments/").await
    }

    /// Create a course as the logged-in teacher. The backend takes this as
    /// a multipart form.
    pub async fn create_course(&self, title: &str, description: &str) -> Result<Course, ApiError> {
        let url = self.url("courses/courses/");
        let response = self
            .execute(|http| {
                let form = Form::new()
                    .text("title", title.to_owned())
                    .text("description", description.to_owned());
                http.post(&url).multipart(form)
            })
            .await?;
        let course = response.json::<Course>().await?;
        tracing::info!(course_id = course.id, title = %course.title, "course created");
        Ok(course)
    }

    pub async fn materials(&self, course_id: i64) -> Result<Vec<CourseMaterial>, ApiError> {
        self.get_json_query("courses/materials/", &[("course", course_id)])
            .await
    }

    /// Upload a file as course material. An empty title lets the backend
    /// fall back to the file name.
    pub async fn upload_material(&self, course_id: i64, title: &str, path: &Path) -> Result<CourseMaterial, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());

        let url = self.url("courses/materials/");
        let response = self
            .execute(|http| {
                let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                let form = Form::new()
                    .text("course", course_id.to_string())
                    .text("title", title.to_owned())
                    .part("file", part);
                http.post(&url).multipart(form)
            })
            .await?;
        let material = response.json::<CourseMaterial>().await?;
        tracing::info!(course_id, material_id = material.id, file = %file_name, "material uploaded");
        Ok(material)
    }
}

pub(crate) fn filter_by_teacher(courses: Vec<Course>, username: &str) -> Vec<Course> {
    courses
        .into_iter()
        .filter(|c| c.teacher.as_ref().is_some_and(|t| t.username() == username))
        .collect()
}

#[cfg(test)]
#[path = "courses_test.rs"]
mod tests;

use classroom_api::{Client, ClassroomApiError, Request};
use secrecy::SecretString;

#[tokio::main]
pub async fn main() -> Result<(), ClassroomApiError> {
    let token = SecretString::from(std::env::var("GOOGLE_ACCESS_TOKEN").unwrap_or_default());
    let client = Client::new(&token);

    let courses = client.send(Request::courses().list().page_size(50u32)).await?;
    for course in courses.courses {
        let work = client
            .send(Request::course_work(course.id.clone()).list())
            .await?;
        println!("{}: {} assignments", course.name, work.course_work.len());
    }
    Ok(())
}

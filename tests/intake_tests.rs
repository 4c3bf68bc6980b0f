/// End-to-end tests of the lead intake pipeline
/// Runs validation, media storage, persistence and queueing against an in-memory store
mod common;

use common::{count_files, MemoryLeadStore};
use navis_api::errors::AppError;
use navis_api::intake::LeadIntake;
use navis_api::leads::{LeadDetails, LeadForm, LeadKind};
use navis_api::notifications::{NotificationJob, NotificationQueue};
use navis_api::uploads::{MediaStore, UploadedFile, MAX_UPLOAD_BYTES};
use tokio::sync::mpsc;

struct Harness {
    intake: LeadIntake<MemoryLeadStore>,
    jobs: mpsc::Receiver<NotificationJob>,
    media_dir: tempfile::TempDir,
}

fn harness(store: MemoryLeadStore) -> Harness {
    let media_dir = tempfile::tempdir().unwrap();
    let (queue, jobs) = NotificationQueue::channel(16);
    let intake = LeadIntake::new(store, MediaStore::new(media_dir.path()), queue);
    Harness {
        intake,
        jobs,
        media_dir,
    }
}

fn contact_form(phone: &str) -> LeadForm {
    LeadForm {
        name: Some("Aigerim".to_string()),
        email: Some("aigerim@example.kg".to_string()),
        phone: Some(phone.to_string()),
        message: Some("We need a landing page".to_string()),
        ..LeadForm::default()
    }
}

fn vacancy_form(phone: &str) -> LeadForm {
    LeadForm {
        name: Some("Bakyt".to_string()),
        email: Some("bakyt@example.kg".to_string()),
        phone: Some(phone.to_string()),
        link: Some("https://github.com/bakyt".to_string()),
        ..LeadForm::default()
    }
}

fn attachment(file_name: &str, size: usize) -> UploadedFile {
    UploadedFile {
        file_name: file_name.to_string(),
        bytes: vec![b'x'; size],
    }
}

fn field_errors(err: AppError) -> navis_api::errors::FieldErrors {
    match err {
        AppError::Validation(fields) => fields,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_valid_contact_is_stored_with_canonical_phone_and_one_job() {
    let mut h = harness(MemoryLeadStore::default());

    let lead = h
        .intake
        .submit(LeadKind::Contact, contact_form("0700 12 34 56"))
        .await
        .unwrap();

    assert_eq!(lead.phone, "+996 700 123 456");
    assert_eq!(lead.kind(), LeadKind::Contact);

    let rows = h.intake.store().rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].phone, "+996 700 123 456");

    let job = h.jobs.try_recv().unwrap();
    assert_eq!(job.lead_id, lead.id);
    assert!(job.text.contains("Телефон: +996 700 123 456"));
    assert!(job.text.contains("We need a landing page"));
    assert_eq!(job.attachment, None);
    assert!(h.jobs.try_recv().is_err());
}

#[tokio::test]
async fn test_valid_vacancy_application_with_attachment() {
    let mut h = harness(MemoryLeadStore::default());
    let mut form = vacancy_form("+996 555 123 456");
    form.file = Some(attachment("My CV.pdf", 2048));

    let lead = h
        .intake
        .submit(LeadKind::VacancyApplication, form)
        .await
        .unwrap();

    assert_eq!(lead.phone, "+996 555 123 456");
    assert_eq!(
        lead.details,
        LeadDetails::VacancyApplication {
            link: "https://github.com/bakyt".to_string()
        }
    );

    let relative = lead.file.clone().unwrap();
    assert!(relative.starts_with("contacts/vacancy/"));
    assert!(relative.ends_with("My_CV.pdf"));

    let stored = h.media_dir.path().join(&relative);
    assert_eq!(std::fs::read(&stored).unwrap().len(), 2048);

    let job = h.jobs.try_recv().unwrap();
    assert_eq!(job.attachment.as_deref(), Some(stored.as_path()));
    assert!(job.text.contains("Ссылка на соцсеть: https://github.com/bakyt"));
}

#[tokio::test]
async fn test_invalid_phone_leaves_no_row_and_no_job() {
    let mut h = harness(MemoryLeadStore::default());
    let mut form = contact_form("12345");
    form.file = Some(attachment("brief.pdf", 10));

    let err = h
        .intake
        .submit(LeadKind::Contact, form)
        .await
        .unwrap_err();

    let fields = field_errors(err);
    assert_eq!(fields.fields().collect::<Vec<_>>(), vec!["phone"]);
    assert!(fields.get("phone").unwrap()[0].contains("+996 XXX XXX XXX"));

    assert!(h.intake.store().rows().is_empty());
    assert!(h.jobs.try_recv().is_err());
    assert_eq!(count_files(h.media_dir.path()), 0);
}

#[tokio::test]
async fn test_unassigned_number_is_rejected() {
    let mut h = harness(MemoryLeadStore::default());

    let err = h
        .intake
        .submit(LeadKind::VacancyApplication, vacancy_form("+996 100 000 000"))
        .await
        .unwrap_err();

    assert!(field_errors(err).contains("phone"));
    assert!(h.intake.store().rows().is_empty());
    assert!(h.jobs.try_recv().is_err());
}

#[tokio::test]
async fn test_oversized_file_is_rejected_before_anything_is_written() {
    let mut h = harness(MemoryLeadStore::default());
    let mut form = contact_form("0700123456");
    form.file = Some(attachment("portfolio.zip", MAX_UPLOAD_BYTES + 1));

    let err = h
        .intake
        .submit(LeadKind::Contact, form)
        .await
        .unwrap_err();

    let fields = field_errors(err);
    assert!(fields.get("file").unwrap()[0].starts_with("File size must not exceed 5 MB"));
    assert!(h.intake.store().rows().is_empty());
    assert!(h.jobs.try_recv().is_err());
    assert_eq!(count_files(h.media_dir.path()), 0);
}

#[tokio::test]
async fn test_file_of_exactly_the_limit_is_accepted() {
    let h = harness(MemoryLeadStore::default());
    let mut form = contact_form("0700123456");
    form.file = Some(attachment("portfolio.zip", MAX_UPLOAD_BYTES));

    h.intake.submit(LeadKind::Contact, form).await.unwrap();
    assert_eq!(count_files(h.media_dir.path()), 1);
}

#[tokio::test]
async fn test_script_attachment_is_rejected() {
    let mut h = harness(MemoryLeadStore::default());

    for name in ["install.sh", "RUN.BAT", "data.json"] {
        let mut form = vacancy_form("0700123456");
        form.file = Some(attachment(name, 64));

        let err = h
            .intake
            .submit(LeadKind::VacancyApplication, form)
            .await
            .unwrap_err();
        assert!(field_errors(err).contains("file"), "{} accepted", name);
    }

    assert!(h.intake.store().rows().is_empty());
    assert!(h.jobs.try_recv().is_err());
    assert_eq!(count_files(h.media_dir.path()), 0);
}

#[tokio::test]
async fn test_all_field_errors_are_reported_together() {
    let h = harness(MemoryLeadStore::default());
    let form = LeadForm {
        name: None,
        email: Some("nope".to_string()),
        phone: Some("+1 202 555 0100".to_string()),
        link: Some("not a url".to_string()),
        file: Some(attachment("x.py", 1)),
        ..LeadForm::default()
    };

    let err = h
        .intake
        .submit(LeadKind::VacancyApplication, form)
        .await
        .unwrap_err();

    assert_eq!(
        field_errors(err).fields().collect::<Vec<_>>(),
        vec!["email", "file", "link", "name", "phone"]
    );
}

#[tokio::test]
async fn test_failed_insert_removes_stored_file_and_enqueues_nothing() {
    let mut h = harness(MemoryLeadStore::failing());
    let mut form = contact_form("0700123456");
    form.file = Some(attachment("brief.pdf", 128));

    let err = h
        .intake
        .submit(LeadKind::Contact, form)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InternalError(_)));
    assert_eq!(count_files(h.media_dir.path()), 0);
    assert!(h.jobs.try_recv().is_err());
}

#[tokio::test]
async fn test_each_submission_gets_its_own_job_and_file() {
    let mut h = harness(MemoryLeadStore::default());

    for _ in 0..3 {
        let mut form = contact_form("+996700123456");
        form.file = Some(attachment("same-name.pdf", 16));
        h.intake.submit(LeadKind::Contact, form).await.unwrap();
    }

    assert_eq!(h.intake.store().rows().len(), 3);
    assert_eq!(count_files(&h.media_dir.path().join("contacts")), 3);

    let mut ids = Vec::new();
    while let Ok(job) = h.jobs.try_recv() {
        ids.push(job.lead_id);
    }
    assert_eq!(ids, vec![1, 2, 3]);
}

//! End-to-end clinic tests against an on-disk database.

use std::sync::Arc;

use mediqueue_core::alerts::RecordingSubscriber;
use mediqueue_core::models::Specialty;
use mediqueue_core::{BookingRequest, Clinic, ClinicConfig, ClinicError};
use tempfile::TempDir;

const USERNAME: &str = "doctor";
const PASSWORD: &str = "mediqueue123";

fn open_clinic(dir: &TempDir) -> Clinic {
    let config = ClinicConfig {
        database_path: dir.path().join("mediqueue.db"),
        upload_dir: dir.path().join("payments"),
        ..ClinicConfig::default()
    };
    Clinic::open(&config).unwrap()
}

fn booking(name: &str, doctor_id: i64, symptoms: &str) -> BookingRequest {
    BookingRequest {
        patient_name: name.into(),
        patient_phone: "9876543210".into(),
        doctor_id,
        symptoms: symptoms.into(),
        proof_file_name: "UPI receipt.png".into(),
        proof_bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[test]
fn test_patient_to_prescription_flow() {
    let dir = tempfile::tempdir().unwrap();
    let clinic = open_clinic(&dir);

    // Patient side: recommend, pick a doctor, book
    let rec = clinic.recommend("itchy red patches on arms");
    assert_eq!(rec.label, Specialty::Psoriasis);

    let doctors = clinic.doctors_for_specialty(rec.label).unwrap();
    assert!(!doctors.is_empty());
    let doctor_id = doctors[0].id;

    let asha = clinic
        .book_appointment(booking("Asha", doctor_id, "itchy red patches on arms"))
        .unwrap();
    let kiran = clinic
        .book_appointment(booking("Kiran", doctor_id, "dry skin"))
        .unwrap();
    assert_eq!((asha.token_number, kiran.token_number), (1, 2));
    assert!(asha.payment_proof.ends_with("_UPI_receipt.png"));

    // Doctor side
    let token = clinic.login(USERNAME, PASSWORD).unwrap();
    let snapshot = clinic.queue_snapshot(&token).unwrap();
    let queue: Vec<_> = snapshot.for_doctor(doctor_id).collect();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].patient_name, "Asha");

    assert_eq!(
        clinic.read_payment_proof(&token, asha.appointment_id).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );

    clinic
        .save_prescription(
            &token,
            asha.appointment_id,
            "Calamine lotion\nCetirizine 10mg",
            Some("Apply twice daily"),
        )
        .unwrap();
    assert!(clinic.complete_appointment(&token, asha.appointment_id).unwrap());

    let slip = clinic.prescription_slip(&token, asha.appointment_id).unwrap();
    let text = slip.render();
    assert!(text.contains("Asha"));
    assert!(text.contains("  - Cetirizine 10mg\n"));
    assert!(text.contains("Psoriasis"));

    // Kiran is the only one waiting; reset renumbers to 1
    assert_eq!(clinic.reset_tokens(&token).unwrap(), 1);
    let snapshot = clinic.queue_snapshot(&token).unwrap();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].patient_name, "Kiran");
    assert_eq!(snapshot.entries[0].token_number, 1);

    let csv = clinic.export_queue_csv(&token).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains(",Kiran,"));
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let booked = {
        let clinic = open_clinic(&dir);
        clinic
            .book_appointment(booking("Asha", 3, "wheezing"))
            .unwrap()
    };

    let clinic = open_clinic(&dir);
    assert_eq!(clinic.list_doctors().unwrap().len(), 20);

    let next = clinic
        .book_appointment(booking("Kiran", 3, "cough"))
        .unwrap();
    assert_eq!(next.token_number, booked.token_number + 1);
}

#[test]
fn test_emergency_reaches_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let clinic = open_clinic(&dir);
    let dashboard = Arc::new(RecordingSubscriber::new());
    clinic.subscribe_alerts(dashboard.clone());

    let alert = clinic
        .trigger_emergency("Ravi", "111", "collapsed, unconscious")
        .unwrap();
    assert_eq!(dashboard.events()[0].alert_id, alert.id);

    let token = clinic.login(USERNAME, PASSWORD).unwrap();
    assert_eq!(clinic.queue_snapshot(&token).unwrap().alerts.len(), 1);

    assert!(clinic.handle_emergency(&token, alert.id, "accepted").unwrap());
    assert!(clinic.queue_snapshot(&token).unwrap().alerts.is_empty());
    assert!(clinic.handle_emergency(&token, alert.id, "completed").unwrap());
}

#[test]
fn test_oversized_proof_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let clinic = open_clinic(&dir);

    let mut request = booking("Asha", 1, "rash");
    request.proof_bytes = vec![0; 5 * 1024 * 1024 + 1];

    assert!(matches!(
        clinic.book_appointment(request),
        Err(ClinicError::Payment(_))
    ));
    assert_eq!(
        std::fs::read_dir(dir.path().join("payments")).unwrap().count(),
        0
    );
}

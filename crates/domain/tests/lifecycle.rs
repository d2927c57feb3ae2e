mod support;

use domain::{
    prescriptions::{PrescriptionStatus, Role},
    Error,
};
use support::{manager, prescription, FakeApi};

#[tokio::test]
async fn test_advance_received_to_dispensing() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, probe) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();

    let status = manager.advance(12, Role::Pharmacist).await.unwrap();

    assert_eq!(status, PrescriptionStatus::Dispensing);
    assert_eq!(api.status_of(12), Some(PrescriptionStatus::Dispensing));
    assert_eq!(
        manager.snapshot().find(12).map(|p| p.status),
        Some(PrescriptionStatus::Dispensing)
    );
    assert_eq!(probe.fired(), 1);
    assert_eq!(probe.last(), 0);
}

#[tokio::test]
async fn test_advance_to_completed_then_no_successor() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Dispensing)]);
    let (manager, _) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();

    let status = manager.advance(12, Role::Pharmacist).await.unwrap();
    assert_eq!(status, PrescriptionStatus::Completed);

    let calls_before = api.calls().len();
    let err = manager.advance(12, Role::Pharmacist).await.unwrap_err();

    assert_eq!(
        err,
        Error::NoSuccessorState {
            status: PrescriptionStatus::Completed
        }
    );
    assert_eq!(api.calls().len(), calls_before);
}

#[tokio::test]
async fn test_advance_created_never_reaches_the_network() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Created)]);
    let (manager, probe) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();
    let calls_before = api.calls().len();

    let err = manager.advance(12, Role::Pharmacist).await.unwrap_err();

    assert_eq!(
        err,
        Error::NoSuccessorState {
            status: PrescriptionStatus::Created
        }
    );
    assert_eq!(api.calls().len(), calls_before);
    assert_eq!(api.status_of(12), Some(PrescriptionStatus::Created));
    assert_eq!(probe.fired(), 0);
}

#[tokio::test]
async fn test_advance_requires_pharmacist() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, _) = manager(api.clone());

    let err = manager.advance(12, Role::Doctor).await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized { role: Role::Doctor, .. }));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_advance_unknown_prescription_loads_detail_first() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, _) = manager(api.clone());

    let status = manager.advance(12, Role::Pharmacist).await.unwrap();

    assert_eq!(status, PrescriptionStatus::Dispensing);
    assert_eq!(
        api.calls(),
        vec![
            "GET /prescriptions/12".to_string(),
            "PATCH /prescriptions/12/status DISPENSING".to_string(),
        ]
    );
    assert_eq!(
        manager.snapshot().detail.map(|d| d.status),
        Some(PrescriptionStatus::Dispensing)
    );
}

#[tokio::test]
async fn test_advance_rejects_skipping_confirmation() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, probe) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();
    api.confirm_as(PrescriptionStatus::Completed);

    let err = manager.advance(12, Role::Pharmacist).await.unwrap_err();

    assert_eq!(
        err,
        Error::InvalidStateTransition {
            from: PrescriptionStatus::Received,
            to: PrescriptionStatus::Completed,
        }
    );
    assert!(err.is_remote());
    assert_eq!(
        manager.snapshot().find(12).map(|p| p.status),
        Some(PrescriptionStatus::Received)
    );
    assert_eq!(probe.fired(), 0);
}

#[tokio::test]
async fn test_advance_surfaces_remote_reason() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, _) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();
    api.fail_with(Some("Prescription is locked by another pharmacist"));

    let err = manager.advance(12, Role::Pharmacist).await.unwrap_err();

    assert_eq!(err.to_string(), "Prescription is locked by another pharmacist");
    assert_eq!(
        manager.snapshot().find(12).map(|p| p.status),
        Some(PrescriptionStatus::Received)
    );
}

#[tokio::test]
async fn test_second_advance_in_flight_is_busy() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, _) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();
    let gate = api.hold_updates();

    let (first, second, _) = tokio::join!(
        manager.advance(12, Role::Pharmacist),
        manager.advance(12, Role::Pharmacist),
        async { gate.notify_one() },
    );

    assert_eq!(first, Ok(PrescriptionStatus::Dispensing));
    assert_eq!(second, Err(Error::Busy { prescription_id: 12 }));
    assert_eq!(
        api.calls()
            .iter()
            .filter(|c| c.starts_with("PATCH"))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_walk_through_every_status_in_order() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, _) = manager(api.clone());
    manager.list_prescriptions().await.unwrap();

    let mut seen = vec![PrescriptionStatus::Received];
    while let Ok(status) = manager.advance(12, Role::Pharmacist).await {
        seen.push(status);
    }

    assert_eq!(
        seen,
        vec![
            PrescriptionStatus::Received,
            PrescriptionStatus::Dispensing,
            PrescriptionStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn test_advance_without_id_sends_nothing() {
    let api = FakeApi::with(vec![prescription(12, PrescriptionStatus::Received)]);
    let (manager, probe) = manager(api.clone());

    let err = manager.advance(0, Role::Pharmacist).await.unwrap_err();

    assert_eq!(err, Error::missing("prescriptionId"));
    assert!(api.calls().is_empty());
    assert_eq!(probe.fired(), 0);
}

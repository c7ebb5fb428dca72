// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Checks every engine must pass.

#![allow(dead_code)]

use students_base::{
    Error, IdPolicy, SharedStorage, StudentData, StudentId,
};

pub fn ada() -> StudentData {
    StudentData::new("Ada", "ada@uni.edu", 21)
}

pub fn alan() -> StudentData {
    StudentData::new("Alan", "alan@uni.edu", 41)
}

pub fn grace() -> StudentData {
    StudentData::new("Grace", "grace@uni.edu", 21)
}

/// Starts from an empty table.
pub async fn reset(storage: &SharedStorage) {
    storage.delete_all_students().await.unwrap();
    assert!(storage.get_students().await.unwrap().is_empty());
}

pub async fn create_then_get(storage: &SharedStorage) {
    reset(storage).await;
    let id = storage.create_student(&ada()).await.unwrap();
    let student = storage.get_student_by_id(&id).await.unwrap();
    assert_eq!(student.id, id);
    assert_eq!(student.data(), ada());
}

pub async fn delete_missing_is_noop(storage: &SharedStorage, missing: StudentId) {
    reset(storage).await;
    storage.create_student(&ada()).await.unwrap();
    storage.create_student(&alan()).await.unwrap();
    let before = storage.get_students().await.unwrap();

    storage.delete_student_by_id(&missing).await.unwrap();

    assert_eq!(storage.get_students().await.unwrap(), before);
}

pub async fn delete_all_restarts_ids(storage: &SharedStorage) {
    reset(storage).await;
    storage.create_student(&ada()).await.unwrap();
    storage.create_student(&alan()).await.unwrap();

    storage.delete_all_students().await.unwrap();
    assert!(storage.get_students().await.unwrap().is_empty());

    let id = storage.create_student(&grace()).await.unwrap();
    if let StudentId::Sequence(id) = id {
        assert_eq!(id, 1);
    }
}

pub async fn update_only_target(storage: &SharedStorage) {
    reset(storage).await;
    let first = storage.create_student(&ada()).await.unwrap();
    let second = storage.create_student(&alan()).await.unwrap();

    let data = StudentData::new("Ada Lovelace", "ada@lovelace.org", 36);
    storage.update_student_by_id(&first, &data).await.unwrap();

    assert_eq!(
        storage.get_student_by_id(&first).await.unwrap().data(),
        data
    );
    assert_eq!(
        storage.get_student_by_id(&second).await.unwrap().data(),
        alan()
    );
}

pub async fn by_age(storage: &SharedStorage) {
    reset(storage).await;
    assert!(matches!(
        storage.get_student_by_age(21).await.unwrap_err(),
        Error::NotFound(_)
    ));

    storage.create_student(&ada()).await.unwrap();
    storage.create_student(&alan()).await.unwrap();
    storage.create_student(&grace()).await.unwrap();

    let student = storage.get_student_by_age(21).await.unwrap();
    assert_eq!(student.age, 21);
    if storage.id_policy() == IdPolicy::Reindexed {
        assert_eq!(student.name, "Ada");
    }
}

pub async fn run_all(storage: &SharedStorage, missing: StudentId) {
    create_then_get(storage).await;
    delete_missing_is_noop(storage, missing).await;
    delete_all_restarts_ids(storage).await;
    update_only_target(storage).await;
    by_age(storage).await;
    reset(storage).await;
}

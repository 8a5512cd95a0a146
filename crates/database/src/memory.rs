use crate::error::{Conflict, DbError};
use crate::store::GradebookStore;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    Entity, Grade, GradeFilter, GradeOwner, GradeWithDetails, Id, NewGrade, NewStudent, NewSubject,
    Page, Student, StudentFilter, Subject, SubjectFilter,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A process-local [`GradebookStore`] with the same constraints as the
/// PostgreSQL schema.
///
/// Every write checks its constraints and applies under one write lock, so two
/// concurrent inserts with the same email cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<Id, Student>,
    subjects: BTreeMap<Id, Subject>,
    grades: BTreeMap<Id, Grade>,
    // One sequence per table, like `BIGSERIAL`.
    student_seq: Id,
    subject_seq: Id,
    grade_seq: Id,
}

fn next_id(seq: &mut Id) -> Id {
    *seq += 1;
    *seq
}

impl Tables {

    fn email_taken(&self, email: &str, excluding: Option<Id>) -> bool {
        self.students
            .values()
            .any(|s| s.email == email && Some(s.id) != excluding)
    }

    fn subject_name_taken(&self, name: &str, excluding: Option<Id>) -> bool {
        self.subjects
            .values()
            .any(|s| s.name == name && Some(s.id) != excluding)
    }

    fn has_grades(&self, owner: GradeOwner) -> bool {
        self.grades.values().any(|g| owner.owns(g))
    }

    fn details(&self, grade: &Grade) -> Option<GradeWithDetails> {
        Some(GradeWithDetails {
            grade: grade.clone(),
            student: self.students.get(&grade.student_id)?.clone(),
            subject: self.subjects.get(&grade.subject_id)?.clone(),
        })
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn paginate<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl GradebookStore for InMemoryStore {
    async fn insert_student(&self, student: &NewStudent) -> Result<Student, DbError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&student.email, None) {
            return Err(DbError::Conflict(Conflict::StudentEmail));
        }
        let created = Student {
            id: next_id(&mut tables.student_seq),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.students.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_student(&self, id: Id) -> Result<Option<Student>, DbError> {
        Ok(self.tables.read().await.students.get(&id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.students.values().find(|s| s.email == email).cloned())
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        let tables = self.tables.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let matching = tables.students.values().filter(|s| match &needle {
            Some(n) => {
                contains_ignore_case(&s.first_name, n)
                    || contains_ignore_case(&s.last_name, n)
                    || contains_ignore_case(&s.email, n)
            }
            None => true,
        });
        Ok(paginate(matching.cloned(), filter.page))
    }

    async fn save_student(&self, student: &Student) -> Result<Student, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&student.id) {
            return Err(DbError::NotFound(Entity::Student));
        }
        if tables.email_taken(&student.email, Some(student.id)) {
            return Err(DbError::Conflict(Conflict::StudentEmail));
        }
        let saved = Student {
            updated_at: Some(Utc::now()),
            ..student.clone()
        };
        tables.students.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete_student(&self, id: Id) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&id) {
            return Ok(false);
        }
        if tables.has_grades(GradeOwner::Student(id)) {
            return Err(DbError::HasDependents(Entity::Student));
        }
        Ok(tables.students.remove(&id).is_some())
    }

    async fn insert_subject(&self, subject: &NewSubject) -> Result<Subject, DbError> {
        let mut tables = self.tables.write().await;
        if tables.subject_name_taken(&subject.name, None) {
            return Err(DbError::Conflict(Conflict::SubjectName));
        }
        let created = Subject {
            id: next_id(&mut tables.subject_seq),
            name: subject.name.clone(),
            description: subject.description.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.subjects.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_subject(&self, id: Id) -> Result<Option<Subject>, DbError> {
        Ok(self.tables.read().await.subjects.get(&id).cloned())
    }

    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.subjects.values().find(|s| s.name == name).cloned())
    }

    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>, DbError> {
        let tables = self.tables.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let matching = tables.subjects.values().filter(|s| match &needle {
            Some(n) => {
                contains_ignore_case(&s.name, n)
                    || s.description
                        .as_deref()
                        .is_some_and(|d| contains_ignore_case(d, n))
            }
            None => true,
        });
        Ok(paginate(matching.cloned(), filter.page))
    }

    async fn save_subject(&self, subject: &Subject) -> Result<Subject, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.subjects.contains_key(&subject.id) {
            return Err(DbError::NotFound(Entity::Subject));
        }
        if tables.subject_name_taken(&subject.name, Some(subject.id)) {
            return Err(DbError::Conflict(Conflict::SubjectName));
        }
        let saved = Subject {
            updated_at: Some(Utc::now()),
            ..subject.clone()
        };
        tables.subjects.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete_subject(&self, id: Id) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.subjects.contains_key(&id) {
            return Ok(false);
        }
        if tables.has_grades(GradeOwner::Subject(id)) {
            return Err(DbError::HasDependents(Entity::Subject));
        }
        Ok(tables.subjects.remove(&id).is_some())
    }

    async fn insert_grade(&self, grade: &NewGrade) -> Result<Grade, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&grade.student_id) {
            return Err(DbError::NotFound(Entity::Student));
        }
        if !tables.subjects.contains_key(&grade.subject_id) {
            return Err(DbError::NotFound(Entity::Subject));
        }
        let created = Grade {
            id: next_id(&mut tables.grade_seq),
            student_id: grade.student_id,
            subject_id: grade.subject_id,
            value: grade.value,
            comment: grade.comment.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.grades.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_grade(&self, id: Id) -> Result<Option<GradeWithDetails>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.grades.get(&id).and_then(|g| tables.details(g)))
    }

    async fn list_grades(&self, filter: &GradeFilter) -> Result<Vec<GradeWithDetails>, DbError> {
        let tables = self.tables.read().await;
        let matching = tables
            .grades
            .values()
            .filter(|g| filter.accepts(g.value))
            .filter_map(|g| tables.details(g));
        Ok(paginate(matching, filter.page))
    }

    async fn list_grades_for(
        &self,
        owner: GradeOwner,
        page: Page,
    ) -> Result<Vec<GradeWithDetails>, DbError> {
        let tables = self.tables.read().await;
        let matching = tables
            .grades
            .values()
            .filter(|g| owner.owns(g))
            .filter_map(|g| tables.details(g));
        Ok(paginate(matching, page))
    }

    async fn grade_values(&self, owner: GradeOwner) -> Result<Vec<Decimal>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .grades
            .values()
            .filter(|g| owner.owns(g))
            .map(|g| g.value)
            .collect())
    }

    async fn save_grade(&self, grade: &Grade) -> Result<Grade, DbError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .grades
            .get_mut(&grade.id)
            .ok_or(DbError::NotFound(Entity::Grade))?;
        // The references are fixed at creation time.
        stored.value = grade.value;
        stored.comment = grade.comment.clone();
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete_grade(&self, id: Id) -> Result<bool, DbError> {
        Ok(self.tables.write().await.grades.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ada() -> NewStudent {
        NewStudent {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn math() -> NewSubject {
        NewSubject {
            name: "Math".to_string(),
            description: Some("Algebra".to_string()),
        }
    }

    fn grade(student_id: Id, subject_id: Id, value: Decimal) -> NewGrade {
        NewGrade {
            student_id,
            subject_id,
            value,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_student_is_retrievable_after_insert() {
        let store = InMemoryStore::new();
        let created = store.insert_student(&ada()).await.unwrap();

        let found = store.find_student(created.id).await.unwrap();
        assert_eq!(found, Some(created.clone()));
        assert_eq!(store.list_students(&StudentFilter::default()).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_each_table_numbers_its_own_rows() {
        let store = InMemoryStore::new();
        let student = store.insert_student(&ada()).await.unwrap();
        let subject = store.insert_subject(&math()).await.unwrap();
        let first = store.insert_grade(&grade(student.id, subject.id, dec!(10))).await.unwrap();
        let second = store.insert_grade(&grade(student.id, subject.id, dec!(11))).await.unwrap();

        assert_eq!((student.id, subject.id), (1, 1));
        assert_eq!((first.id, second.id), (1, 2));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        store.insert_student(&ada()).await.unwrap();

        let twin = NewStudent {
            first_name: "Augusta".to_string(),
            ..ada()
        };
        let err = store.insert_student(&twin).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(Conflict::StudentEmail)));
        assert_eq!(store.list_students(&StudentFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_with_same_email_admit_one() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert_student(&ada()).await })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_save_student_keeps_own_email() {
        let store = InMemoryStore::new();
        let mut student = store.insert_student(&ada()).await.unwrap();
        student.first_name = "Augusta".to_string();

        let saved = store.save_student(&student).await.unwrap();
        assert_eq!(saved.first_name, "Augusta");
        assert!(saved.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_save_student_rejects_someone_elses_email() {
        let store = InMemoryStore::new();
        store.insert_student(&ada()).await.unwrap();
        let mut other = store
            .insert_student(&NewStudent {
                email: "charles@example.com".to_string(),
                ..ada()
            })
            .await
            .unwrap();
        other.email = "ada@example.com".to_string();

        let err = store.save_student(&other).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(Conflict::StudentEmail)));
    }

    #[tokio::test]
    async fn test_grade_requires_existing_references() {
        let store = InMemoryStore::new();
        let student = store.insert_student(&ada()).await.unwrap();

        let err = store.insert_grade(&grade(student.id, 999, dec!(12))).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(Entity::Subject)));

        let err = store.insert_grade(&grade(999, 999, dec!(12))).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(Entity::Student)));

        assert!(store.list_grades(&GradeFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_blocked_while_grades_exist() {
        let store = InMemoryStore::new();
        let student = store.insert_student(&ada()).await.unwrap();
        let subject = store.insert_subject(&math()).await.unwrap();
        let g = store.insert_grade(&grade(student.id, subject.id, dec!(14))).await.unwrap();

        assert!(matches!(
            store.delete_student(student.id).await,
            Err(DbError::HasDependents(Entity::Student))
        ));
        assert!(matches!(
            store.delete_subject(subject.id).await,
            Err(DbError::HasDependents(Entity::Subject))
        ));

        assert!(store.delete_grade(g.id).await.unwrap());
        assert!(store.delete_student(student.id).await.unwrap());
        assert!(store.delete_subject(subject.id).await.unwrap());
        assert!(!store.delete_student(student.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_grade_range_and_owner_filters() {
        let store = InMemoryStore::new();
        let student = store.insert_student(&ada()).await.unwrap();
        let subject = store.insert_subject(&math()).await.unwrap();
        for value in [dec!(8), dec!(10), dec!(12.5), dec!(15), dec!(17)] {
            store.insert_grade(&grade(student.id, subject.id, value)).await.unwrap();
        }

        let filter = GradeFilter {
            min_value: Some(dec!(10)),
            max_value: Some(dec!(15)),
            ..Default::default()
        };
        let values: Vec<_> = store
            .list_grades(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.grade.value)
            .collect();
        assert_eq!(values, vec![dec!(10), dec!(12.5), dec!(15)]);

        let page = store
            .list_grades_for(GradeOwner::Student(student.id), Page::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].grade.value, dec!(10));
        assert_eq!(page[0].subject.name, "Math");

        let values = store.grade_values(GradeOwner::Subject(subject.id)).await.unwrap();
        assert_eq!(values.len(), 5);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let store = InMemoryStore::new();
        store.insert_student(&ada()).await.unwrap();
        store
            .insert_student(&NewStudent {
                first_name: "Charles".to_string(),
                last_name: "Babbage".to_string(),
                email: "charles@engine.org".to_string(),
            })
            .await
            .unwrap();

        let filter = StudentFilter {
            search: Some("LOVE".to_string()),
            ..Default::default()
        };
        let found = store.list_students(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Ada");

        let filter = SubjectFilter {
            search: Some("alg".to_string()),
            ..Default::default()
        };
        store.insert_subject(&math()).await.unwrap();
        assert_eq!(store.list_subjects(&filter).await.unwrap().len(), 1);
    }
}

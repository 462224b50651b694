//! Scenarios every backend must pass with identical results.

use chrono::NaiveDate;
use filmorate_core::db::open_db_in_memory;
use filmorate_core::{
    EntityKind, Film, FilmRepository, FriendshipStatus, Genre, MemoryFilmRepository,
    MemoryReferenceCatalog, MemoryUserRepository, Mpa, RepoError, SqliteFilmRepository, SqliteUserRepository, User,
    UserRepository,
};
use rusqlite::Connection;

fn memory_backend() -> (MemoryFilmRepository, MemoryUserRepository) {
    let users = MemoryUserRepository::new();
    let films = MemoryFilmRepository::new(MemoryReferenceCatalog::seeded(), users.clone());
    (films, users)
}

fn sqlite_backend(conn: &Connection) -> (SqliteFilmRepository<'_>, SqliteUserRepository<'_>) {
    (
        SqliteFilmRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    )
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_user(login: &str) -> User {
    let mut user = User::new(format!("{login}@example.com"), login);
    user.name = login.to_uppercase();
    user.birthday = Some(date(1986, 4, 28));
    user
}

fn create_then_find_returns_same_record<F: FilmRepository, U: UserRepository>(films: &F, users: &U) {
    let mut film = Film::new("Alien");
    film.description = Some("In space no one can hear you scream".to_string());
    film.release_date = Some(date(1979, 5, 25));
    film.duration = Some(117);
    film.mpa = Some(Mpa::from_id(4));
    film.genres = Some(vec![Genre::from_id(4), Genre::from_id(2), Genre::from_id(4)]);

    let created = films.create(&film).unwrap();
    assert!(created.id.is_some());
    assert_eq!(created.name, "Alien");
    assert_eq!(created.duration, Some(117));
    assert_eq!(created.mpa.as_ref().map(|mpa| mpa.name.as_str()), Some("R"));
    assert_eq!(
        created.genres,
        Some(vec![Genre::new(2, "Drama"), Genre::new(4, "Thriller")])
    );
    assert!(created.likes.is_empty());

    let found = films.find_by_id(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(found, created);
    assert!(films.exists(created.id.unwrap()).unwrap());

    let user = users.create(&sample_user("maria")).unwrap();
    assert_eq!(users.find_by_id(user.id.unwrap()).unwrap().unwrap(), user);
    assert_eq!(user.name, "MARIA");
    assert_eq!(user.birthday, Some(date(1986, 4, 28)));
}

#[test]
fn memory_create_then_find_returns_same_record() {
    let (films, users) = memory_backend();
    create_then_find_returns_same_record(&films, &users);
}

#[test]
fn sqlite_create_then_find_returns_same_record() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    create_then_find_returns_same_record(&films, &users);
}

fn ids_increase_and_find_all_is_ordered<F: FilmRepository, U: UserRepository>(films: &F, users: &U) {
    let first = films.create(&Film::new("first")).unwrap();
    let second = films.create(&Film::new("second")).unwrap();
    let third = films.create(&Film::new("third")).unwrap();
    assert!(first.id < second.id);
    assert!(second.id < third.id);

    let listed: Vec<_> = films.find_all().unwrap().into_iter().map(|f| f.id).collect();
    assert_eq!(listed, vec![first.id, second.id, third.id]);

    let alpha = users.create(&sample_user("alpha")).unwrap();
    let beta = users.create(&sample_user("beta")).unwrap();
    assert!(alpha.id < beta.id);
    let listed: Vec<_> = users.find_all().unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(listed, vec![alpha.id, beta.id]);

    assert!(!films.exists(third.id.unwrap() + 100).unwrap());
    assert!(!users.exists(beta.id.unwrap() + 100).unwrap());
    assert!(films.find_by_id(third.id.unwrap() + 100).unwrap().is_none());
}

#[test]
fn memory_ids_increase_and_find_all_is_ordered() {
    let (films, users) = memory_backend();
    ids_increase_and_find_all_is_ordered(&films, &users);
}

#[test]
fn sqlite_ids_increase_and_find_all_is_ordered() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    ids_increase_and_find_all_is_ordered(&films, &users);
}

fn likes_are_idempotent<F: FilmRepository, U: UserRepository>(films: &F, users: &U) {
    let film_id = films.create(&Film::new("Heat")).unwrap().id.unwrap();
    let user_id = users.create(&sample_user("fan")).unwrap().id.unwrap();

    let once = films.add_like(film_id, user_id).unwrap();
    let twice = films.add_like(film_id, user_id).unwrap();
    assert_eq!(once.likes.len(), 1);
    assert_eq!(twice.likes, once.likes);
    assert!(twice.likes.contains(&user_id));

    let unrelated = films.remove_like(film_id, user_id + 100).unwrap();
    assert_eq!(unrelated.likes, once.likes);

    let removed = films.remove_like(film_id, user_id).unwrap();
    assert!(removed.likes.is_empty());
    let removed_again = films.remove_like(film_id, user_id).unwrap();
    assert!(removed_again.likes.is_empty());
    assert!(films.find_by_id(film_id).unwrap().unwrap().likes.is_empty());
}

#[test]
fn memory_likes_are_idempotent() {
    let (films, users) = memory_backend();
    likes_are_idempotent(&films, &users);
}

#[test]
fn sqlite_likes_are_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    likes_are_idempotent(&films, &users);
}

fn friend_edges_are_directed<F: FilmRepository, U: UserRepository>(_films: &F, users: &U) {
    let first = users.create(&sample_user("first")).unwrap().id.unwrap();
    let second = users.create(&sample_user("second")).unwrap().id.unwrap();

    let added = users.add_friend(first, second).unwrap();
    assert_eq!(added.friends.get(&second), Some(&FriendshipStatus::Pending));
    assert!(users.find_by_id(second).unwrap().unwrap().friends.is_empty());

    let confirmed = users.confirm_friend(first, second).unwrap();
    assert_eq!(confirmed.friends.get(&second), Some(&FriendshipStatus::Confirmed));
    assert!(users.find_by_id(second).unwrap().unwrap().friends.is_empty());

    let reverse = users.add_friend(second, first).unwrap();
    assert_eq!(reverse.friends.get(&first), Some(&FriendshipStatus::Pending));

    let re_added = users.add_friend(first, second).unwrap();
    assert_eq!(re_added.friends.get(&second), Some(&FriendshipStatus::Confirmed));

    let removed = users.remove_friend(first, second).unwrap();
    assert!(removed.friends.is_empty());
    let still_there = users.find_by_id(second).unwrap().unwrap();
    assert_eq!(still_there.friends.get(&first), Some(&FriendshipStatus::Pending));
}

#[test]
fn memory_friend_edges_are_directed() {
    let (films, users) = memory_backend();
    friend_edges_are_directed(&films, &users);
}

#[test]
fn sqlite_friend_edges_are_directed() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    friend_edges_are_directed(&films, &users);
}

fn missing_edges_are_no_ops<F: FilmRepository, U: UserRepository>(_films: &F, users: &U) {
    let first = users.create(&sample_user("lonely")).unwrap().id.unwrap();
    let second = users.create(&sample_user("stranger")).unwrap().id.unwrap();

    let removed = users.remove_friend(first, second).unwrap();
    assert!(removed.friends.is_empty());

    let confirmed = users.confirm_friend(first, second).unwrap();
    assert!(confirmed.friends.is_empty());
}

#[test]
fn memory_missing_edges_are_no_ops() {
    let (films, users) = memory_backend();
    missing_edges_are_no_ops(&films, &users);
}

#[test]
fn sqlite_missing_edges_are_no_ops() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    missing_edges_are_no_ops(&films, &users);
}

fn update_replaces_genres_and_keeps_relations<F: FilmRepository, U: UserRepository>(
    films: &F,
    users: &U,
) {
    let mut film = Film::new("Titanic");
    film.mpa = Some(Mpa::from_id(3));
    film.genres = Some(vec![Genre::from_id(1), Genre::from_id(2)]);
    let created = films.create(&film).unwrap();
    let film_id = created.id.unwrap();

    let user_id = users.create(&sample_user("viewer")).unwrap().id.unwrap();
    films.add_like(film_id, user_id).unwrap();

    let mut replace = created.clone();
    replace.genres = Some(vec![Genre::from_id(2)]);
    replace.likes.clear();
    films.update(&replace).unwrap();

    let found = films.find_by_id(film_id).unwrap().unwrap();
    assert_eq!(found.genres, Some(vec![Genre::new(2, "Drama")]));
    assert_eq!(found.mpa.as_ref().map(|mpa| mpa.id), Some(3));
    assert_eq!(found.mpa.as_ref().map(|mpa| mpa.name.as_str()), Some("PG-13"));
    assert!(found.likes.contains(&user_id));

    let mut absent = found.clone();
    absent.genres = None;
    absent.description = Some("Updated".to_string());
    let kept = films.update(&absent).unwrap();
    assert_eq!(kept.genres, Some(vec![Genre::new(2, "Drama")]));
    assert_eq!(kept.description.as_deref(), Some("Updated"));

    let mut empty = kept.clone();
    empty.genres = Some(Vec::new());
    let cleared = films.update(&empty).unwrap();
    assert_eq!(cleared.genres, Some(Vec::new()));
    assert_eq!(films.find_by_id(film_id).unwrap().unwrap(), cleared);
}

#[test]
fn memory_update_replaces_genres_and_keeps_relations() {
    let (films, users) = memory_backend();
    update_replaces_genres_and_keeps_relations(&films, &users);
}

#[test]
fn sqlite_update_replaces_genres_and_keeps_relations() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    update_replaces_genres_and_keeps_relations(&films, &users);
}

fn user_update_keeps_friend_edges<F: FilmRepository, U: UserRepository>(_films: &F, users: &U) {
    let first = users.create(&sample_user("owner")).unwrap();
    let second = users.create(&sample_user("buddy")).unwrap();
    let first_id = first.id.unwrap();
    let second_id = second.id.unwrap();
    users.add_friend(first_id, second_id).unwrap();

    let mut renamed = first.clone();
    renamed.name = "Owner Renamed".to_string();
    renamed.email = "renamed@example.com".to_string();
    let updated = users.update(&renamed).unwrap();

    assert_eq!(updated.name, "Owner Renamed");
    assert_eq!(updated.email, "renamed@example.com");
    assert_eq!(updated.friends.get(&second_id), Some(&FriendshipStatus::Pending));
}

#[test]
fn memory_user_update_keeps_friend_edges() {
    let (films, users) = memory_backend();
    user_update_keeps_friend_edges(&films, &users);
}

#[test]
fn sqlite_user_update_keeps_friend_edges() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    user_update_keeps_friend_edges(&films, &users);
}

fn film_without_relations_lists_empty_sets<F: FilmRepository, U: UserRepository>(
    films: &F,
    _users: &U,
) {
    let mut film = Film::new("Titanic");
    film.duration = Some(180);
    film.release_date = Some(date(1998, 1, 1));
    films.create(&film).unwrap();

    let listed = films.find_all().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Titanic");
    assert_eq!(listed[0].duration, Some(180));
    assert_eq!(listed[0].release_date, Some(date(1998, 1, 1)));
    assert_eq!(listed[0].mpa, None);
    assert_eq!(listed[0].genres, Some(Vec::new()));
    assert!(listed[0].likes.is_empty());
}

#[test]
fn memory_film_without_relations_lists_empty_sets() {
    let (films, users) = memory_backend();
    film_without_relations_lists_empty_sets(&films, &users);
}

#[test]
fn sqlite_film_without_relations_lists_empty_sets() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    film_without_relations_lists_empty_sets(&films, &users);
}

fn missing_owner_is_not_found<F: FilmRepository, U: UserRepository>(films: &F, users: &U) {
    let user_id = users.create(&sample_user("ghost_hunter")).unwrap().id.unwrap();

    let err = films.add_like(404, user_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { kind: EntityKind::Film, id: 404 }));
    let err = films.remove_like(404, user_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { kind: EntityKind::Film, id: 404 }));

    let err = users.add_friend(404, user_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { kind: EntityKind::User, id: 404 }));
    let err = users.confirm_friend(404, user_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { kind: EntityKind::User, id: 404 }));

    let mut film = Film::new("Nowhere");
    film.id = Some(404);
    let err = films.update(&film).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { kind: EntityKind::Film, id: 404 }));

    let err = films.update(&Film::new("No id")).unwrap_err();
    assert!(matches!(err, RepoError::MissingId(EntityKind::Film)));

    let mut user = sample_user("nobody");
    user.id = Some(404);
    let err = users.update(&user).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { kind: EntityKind::User, id: 404 }));
}

#[test]
fn memory_missing_owner_is_not_found() {
    let (films, users) = memory_backend();
    missing_owner_is_not_found(&films, &users);
}

#[test]
fn sqlite_missing_owner_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    missing_owner_is_not_found(&films, &users);
}

fn unknown_reference_ids_are_rejected<F: FilmRepository, U: UserRepository>(
    films: &F,
    _users: &U,
) {
    let mut bad_mpa = Film::new("Bad rating");
    bad_mpa.mpa = Some(Mpa::from_id(99));
    assert!(matches!(films.create(&bad_mpa), Err(RepoError::Constraint(_))));

    let mut bad_genre = Film::new("Bad genre");
    bad_genre.genres = Some(vec![Genre::from_id(1), Genre::from_id(99)]);
    assert!(matches!(films.create(&bad_genre), Err(RepoError::Constraint(_))));

    assert!(films.find_all().unwrap().is_empty());

    let mut good = Film::new("Good");
    good.genres = Some(vec![Genre::from_id(1)]);
    let created = films.create(&good).unwrap();

    let mut broken_update = created.clone();
    broken_update.genres = Some(vec![Genre::from_id(5), Genre::from_id(99)]);
    assert!(matches!(films.update(&broken_update), Err(RepoError::Constraint(_))));

    let unchanged = films.find_by_id(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(unchanged.genres, Some(vec![Genre::new(1, "Comedy")]));
}

#[test]
fn memory_unknown_reference_ids_are_rejected() {
    let (films, users) = memory_backend();
    unknown_reference_ids_are_rejected(&films, &users);
}

#[test]
fn sqlite_unknown_reference_ids_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    unknown_reference_ids_are_rejected(&films, &users);
}

fn relations_to_unknown_users_are_rejected<F: FilmRepository, U: UserRepository>(
    films: &F,
    users: &U,
) {
    let film_id = films.create(&Film::new("Vertigo")).unwrap().id.unwrap();
    let user_id = users.create(&sample_user("known")).unwrap().id.unwrap();

    assert!(matches!(films.add_like(film_id, 777), Err(RepoError::Constraint(_))));
    assert!(films.find_by_id(film_id).unwrap().unwrap().likes.is_empty());

    assert!(matches!(users.add_friend(user_id, 999), Err(RepoError::Constraint(_))));
    assert!(users.find_by_id(user_id).unwrap().unwrap().friends.is_empty());

    let unliked = films.remove_like(film_id, 777).unwrap();
    assert!(unliked.likes.is_empty());
    let unfriended = users.remove_friend(user_id, 999).unwrap();
    assert!(unfriended.friends.is_empty());
    let unconfirmed = users.confirm_friend(user_id, 999).unwrap();
    assert!(unconfirmed.friends.is_empty());
}

#[test]
fn memory_relations_to_unknown_users_are_rejected() {
    let (films, users) = memory_backend();
    relations_to_unknown_users_are_rejected(&films, &users);
}

#[test]
fn sqlite_relations_to_unknown_users_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (films, users) = sqlite_backend(&conn);
    relations_to_unknown_users_are_rejected(&films, &users);
}

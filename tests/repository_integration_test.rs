// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 四张业务表的 CRUD、级联删除、唯一约束、半开区间查询
// ==========================================


use mealzy::repository::{
    IngredientRepository, MealPlanRepository, RecipeIngredientRepository, RecipeRepository,
    RepositoryError,
};
use mealzy::{Ingredient, MealPlanEntry, MealType, Recipe, RecipeIngredient};
use test_helpers::{create_test_db, date, shared_connection};

struct Repos {
    ingredients: IngredientRepository,
    recipes: RecipeRepository,
    links: RecipeIngredientRepository,
    meal_plans: MealPlanRepository,
}

fn setup() -> (tempfile::NamedTempFile, Repos) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path);
    let repos = Repos {
        ingredients: IngredientRepository::from_connection(conn.clone()),
        recipes: RecipeRepository::from_connection(conn.clone()),
        links: RecipeIngredientRepository::from_connection(conn.clone()),
        meal_plans: MealPlanRepository::from_connection(conn),
    };
    (temp_file, repos)
}

#[test]
fn test_ingredient_crud() {
    let (_tmp, repos) = setup();

    let egg = repos
        .ingredients
        .insert(&Ingredient::new("Egg", "12", "pcs").with_category("Dairy"))
        .unwrap();
    let milk = repos
        .ingredients
        .insert(&Ingredient::new("Milk", "1", "L").with_category("Dairy").with_availability(false))
        .unwrap();
    repos
        .ingredients
        .insert(&Ingredient::new("Apple", "3", "pcs").with_category("Fruit"))
        .unwrap();

    assert_eq!(repos.ingredients.count().unwrap(), 3);
    assert_eq!(repos.ingredients.categories().unwrap(), vec!["Dairy", "Fruit"]);

    let names: Vec<String> = repos
        .ingredients
        .list_all()
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["Egg", "Milk", "Apple"]);

    let available = repos.ingredients.available_ids().unwrap();
    assert!(available.contains(&egg));
    assert!(!available.contains(&milk));

    let mut loaded = repos.ingredients.find_by_id(milk).unwrap().unwrap();
    loaded.is_available = true;
    repos.ingredients.update(&loaded).unwrap();
    assert!(repos.ingredients.available_ids().unwrap().contains(&milk));

    assert!(repos.ingredients.delete_by_id(egg).unwrap());
    assert!(!repos.ingredients.delete_by_id(egg).unwrap());
    assert!(repos.ingredients.find_by_id(egg).unwrap().is_none());
}

#[test]
fn test_ingredient_bulk_insert_and_filtered_listings() {
    let (_tmp, repos) = setup();

    let ids = repos
        .ingredients
        .insert_many(&[
            Ingredient::new("Yogurt", "2", "cups").with_category("Dairy"),
            Ingredient::new("Butter", "1", "block")
                .with_category("Dairy")
                .with_availability(false),
            Ingredient::new("Banana", "6", "pcs").with_category("Fruit"),
        ])
        .unwrap();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let dairy: Vec<String> = repos
        .ingredients
        .list_by_category("Dairy")
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(dairy, vec!["Butter", "Yogurt"]);
    assert!(repos.ingredients.list_by_category("Grain").unwrap().is_empty());

    let available: Vec<String> = repos
        .ingredients
        .list_available()
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(available, vec!["Banana", "Yogurt"]);
}

#[test]
fn test_update_missing_row_is_not_found() {
    let (_tmp, repos) = setup();

    let mut ghost = Ingredient::new("Ghost", "1", "pc");
    ghost.id = 999;
    let err = repos.ingredients.update(&ghost).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_recipe_queries() {
    let (_tmp, repos) = setup();

    let pancakes = repos
        .recipes
        .insert(&Recipe::new("Pancakes", MealType::Breakfast))
        .unwrap();
    repos
        .recipes
        .insert(&Recipe::new("Pasta", MealType::Dinner))
        .unwrap();

    assert_eq!(repos.recipes.count().unwrap(), 2);
    assert_eq!(repos.recipes.list_by_meal_type(MealType::Dinner).unwrap().len(), 1);
    assert_eq!(repos.recipes.search_by_name("pa").unwrap().len(), 2);
    assert_eq!(repos.recipes.search_by_name("cake").unwrap().len(), 1);

    assert!(repos.recipes.toggle_favorite(pancakes).unwrap());
    let favorites = repos.recipes.list_favorites().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, pancakes);
    assert!(!repos.recipes.toggle_favorite(pancakes).unwrap());
}

#[test]
fn test_recipe_servings_check_constraint() {
    let (_tmp, repos) = setup();

    let mut recipe = Recipe::new("Nothing", MealType::Snack);
    recipe.servings = 0;
    let err = repos.recipes.insert(&recipe).unwrap_err();
    assert!(matches!(err, RepositoryError::CheckConstraintViolation(_)));
}

#[test]
fn test_links_and_cascade_delete() {
    let (_tmp, repos) = setup();

    let flour = repos.ingredients.insert(&Ingredient::new("Flour", "1", "kg")).unwrap();
    let sugar = repos
        .ingredients
        .insert(&Ingredient::new("Sugar", "1", "kg").with_availability(false))
        .unwrap();
    let cake = repos.recipes.insert(&Recipe::new("Cake", MealType::Snack)).unwrap();

    repos
        .links
        .upsert_many(&[
            RecipeIngredient::new(cake, flour, "200", "g"),
            RecipeIngredient::new(cake, sugar, "100", "g"),
        ])
        .unwrap();

    // 同一复合主键再次写入覆盖数量
    repos
        .links
        .upsert(&RecipeIngredient::new(cake, flour, "250", "g"))
        .unwrap();
    let links = repos.links.find_by_recipe(cake).unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.iter().any(|l| l.ingredient_id == flour && l.quantity == "250"));

    let details = repos.links.find_details_by_recipe(cake).unwrap();
    assert_eq!(details.len(), 2);
    assert!(details.iter().any(|d| d.ingredient_name == "Sugar" && !d.is_available));
    assert_eq!(repos.links.find_available_by_recipe(cake).unwrap().len(), 1);

    // 删除食材 => 关联级联删除
    repos.ingredients.delete_by_id(sugar).unwrap();
    assert_eq!(repos.links.find_by_recipe(cake).unwrap().len(), 1);

    // 删除菜谱 => 关联与餐单级联删除
    repos
        .meal_plans
        .insert(&MealPlanEntry::new(cake, date(2024, 1, 9), MealType::Snack, 2))
        .unwrap();
    repos.recipes.delete_by_id(cake).unwrap();
    assert!(repos.links.find_by_recipe(cake).unwrap().is_empty());
    assert!(repos.meal_plans.list_all().unwrap().is_empty());
}

#[test]
fn test_link_to_missing_ingredient_violates_foreign_key() {
    let (_tmp, repos) = setup();

    let recipe = repos.recipes.insert(&Recipe::new("Soup", MealType::Lunch)).unwrap();
    let err = repos
        .links
        .upsert(&RecipeIngredient::new(recipe, 404, "1", "pc"))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
}

#[test]
fn test_meal_plan_range_is_half_open() {
    let (_tmp, repos) = setup();

    let recipe = repos.recipes.insert(&Recipe::new("Omelette", MealType::Breakfast)).unwrap();
    for day in [6, 7, 13, 14] {
        repos
            .meal_plans
            .insert(&MealPlanEntry::new(recipe, date(2024, 1, day), MealType::Breakfast, 1))
            .unwrap();
    }

    let start = date(2024, 1, 7);
    let end = date(2024, 1, 14);
    let in_week = repos.meal_plans.find_in_range(start, end).unwrap();
    let days: Vec<_> = in_week.iter().map(|e| e.date).collect();
    assert_eq!(days, vec![date(2024, 1, 7), date(2024, 1, 13)]);
    assert_eq!(repos.meal_plans.count_in_range(start, end).unwrap(), 2);
}

#[test]
fn test_meal_plan_slot_is_unique() {
    let (_tmp, repos) = setup();

    let a = repos.recipes.insert(&Recipe::new("A", MealType::Dinner)).unwrap();
    let b = repos.recipes.insert(&Recipe::new("B", MealType::Dinner)).unwrap();
    let day = date(2024, 1, 9);

    let first = repos
        .meal_plans
        .insert(&MealPlanEntry::new(a, day, MealType::Dinner, 2))
        .unwrap();
    let err = repos
        .meal_plans
        .insert(&MealPlanEntry::new(b, day, MealType::Dinner, 2))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

    let slot = repos.meal_plans.find_by_slot(day, MealType::Dinner).unwrap().unwrap();
    assert_eq!(slot.id, first);
    assert_eq!(slot.recipe_id, a);
    assert!(repos.meal_plans.find_by_slot(day, MealType::Lunch).unwrap().is_none());
}

#[test]
fn test_meal_plans_sorted_by_date_then_slot() {
    let (_tmp, repos) = setup();

    let r = repos.recipes.insert(&Recipe::new("Any", MealType::Lunch)).unwrap();
    let day = date(2024, 1, 9);
    for meal_type in [MealType::Snack, MealType::Breakfast, MealType::Dinner] {
        repos
            .meal_plans
            .insert(&MealPlanEntry::new(r, day, meal_type, 1))
            .unwrap();
    }
    repos
        .meal_plans
        .insert(&MealPlanEntry::new(r, date(2024, 1, 8), MealType::Snack, 1))
        .unwrap();

    let order: Vec<_> = repos
        .meal_plans
        .list_all()
        .unwrap()
        .into_iter()
        .map(|e| (e.date, e.meal_type))
        .collect();
    assert_eq!(
        order,
        vec![
            (date(2024, 1, 8), MealType::Snack),
            (day, MealType::Breakfast),
            (day, MealType::Dinner),
            (day, MealType::Snack),
        ]
    );
}

#[test]
fn test_delete_all_links_for_recipe() {
    let (_tmp, repos) = setup();

    let rice = repos.ingredients.insert(&Ingredient::new("Rice", "1", "kg")).unwrap();
    let beans = repos.ingredients.insert(&Ingredient::new("Beans", "1", "can")).unwrap();
    let bowl = repos.recipes.insert(&Recipe::new("Bowl", MealType::Lunch)).unwrap();
    let side = repos.recipes.insert(&Recipe::new("Side", MealType::Dinner)).unwrap();
    repos
        .links
        .upsert_many(&[
            RecipeIngredient::new(bowl, rice, "1", "cup"),
            RecipeIngredient::new(bowl, beans, "1", "can"),
            RecipeIngredient::new(side, rice, "0.5", "cup"),
        ])
        .unwrap();

    assert_eq!(repos.links.delete_all_for_recipe(bowl).unwrap(), 2);
    assert_eq!(repos.links.delete_all_for_recipe(bowl).unwrap(), 0);
    assert!(repos.links.find_by_recipe(bowl).unwrap().is_empty());
    assert_eq!(repos.links.find_by_recipe(side).unwrap().len(), 1);
    // 菜谱与食材本身不受影响
    assert_eq!(repos.recipes.count().unwrap(), 2);
    assert_eq!(repos.ingredients.count().unwrap(), 2);
}

#[test]
fn test_insert_recipe_with_links_is_atomic() {
    let (_tmp, repos) = setup();

    let oats = repos.ingredients.insert(&Ingredient::new("Oats", "1", "kg")).unwrap();

    let porridge = repos
        .recipes
        .insert_with_links(
            &Recipe::new("Porridge", MealType::Breakfast),
            &[RecipeIngredient::new(0, oats, "80", "g")],
        )
        .unwrap();
    let links = repos.links.find_by_recipe(porridge).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].recipe_id, porridge);

    let err = repos
        .recipes
        .insert_with_links(
            &Recipe::new("Granola", MealType::Breakfast),
            &[
                RecipeIngredient::new(0, oats, "100", "g"),
                RecipeIngredient::new(0, 999, "1", "pc"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    assert_eq!(repos.recipes.count().unwrap(), 1);
    assert_eq!(repos.links.find_by_ingredient(oats).unwrap().len(), 1);
}

#[test]
fn test_restore_ingredient_skips_links_to_deleted_recipes() {
    let (_tmp, repos) = setup();

    let herb = repos.ingredients.insert(&Ingredient::new("Herb", "1", "bunch")).unwrap();
    let keep = repos.recipes.insert(&Recipe::new("Keep", MealType::Dinner)).unwrap();
    let gone = repos.recipes.insert(&Recipe::new("Gone", MealType::Dinner)).unwrap();
    repos
        .links
        .upsert_many(&[
            RecipeIngredient::new(keep, herb, "1", "tbsp"),
            RecipeIngredient::new(gone, herb, "2", "tbsp"),
        ])
        .unwrap();

    let ingredient = repos.ingredients.find_by_id(herb).unwrap().unwrap();
    let links = repos.links.find_by_ingredient(herb).unwrap();
    repos.ingredients.delete_by_id(herb).unwrap();
    repos.recipes.delete_by_id(gone).unwrap();

    let restored = repos.ingredients.restore_with_links(&ingredient, &links).unwrap();
    assert_eq!(restored, 1);
    assert_eq!(repos.ingredients.find_by_id(herb).unwrap(), Some(ingredient));
    let keep_links = repos.links.find_by_recipe(keep).unwrap();
    assert_eq!(keep_links.len(), 1);
    assert_eq!(keep_links[0].quantity, "1");
}

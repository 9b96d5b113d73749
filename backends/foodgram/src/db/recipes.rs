use std::collections::{HashMap, HashSet};

use actix::prelude::*;
use diesel::pg::Pg;
use diesel::prelude::*;

use crate::api::recipes::{
    CreateRecipe, DeleteRecipe, GetRecipe, GetRecipes, IngredientAmount, RecipeFilter,
    RecipeIngredientResponse, RecipeListResponse, RecipeResponse, UpdateRecipe,
};
use crate::api::users::UserResponse;
use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::ingredient::{Ingredient, NewRecipeIngredient};
use crate::models::recipe::{NewRecipe, Recipe, UpdateRecipe as RecipeChangeset};
use crate::models::tag::{NewRecipeTag, Tag};
use crate::models::user::{User, UserId};
use crate::pagination::{Page, Paginated};
use crate::schema::{
    favorite_recipes, follows, ingredients, recipe_ingredients, recipe_tags, recipes,
    shopping_carts, tags, users,
};

pub const MAX_AMOUNT: i32 = 32000;

/// A complete recipe as submitted by its author, image already stored.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

/// An edit of a recipe. `tags` and `ingredients` replace the current sets.
#[derive(Debug, Clone)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

impl Handler<CreateRecipe> for DbExecutor {
    type Result = AppResult<RecipeResponse>;

    fn handle(&mut self, msg: CreateRecipe, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let image = self.media.store(msg.image)?;

        let draft = RecipeDraft {
            name: msg.recipe.name,
            text: msg.recipe.text,
            image,
            cooking_time: msg.recipe.cooking_time,
            tags: msg.recipe.tags,
            ingredients: msg.recipe.ingredients,
        };

        create_recipe(&mut conn, msg.auth.user_id(), &draft).inspect_err(|_| {
            self.media.discard(&draft.image);
        })
    }
}

impl Handler<UpdateRecipe> for DbExecutor {
    type Result = AppResult<RecipeResponse>;

    fn handle(&mut self, msg: UpdateRecipe, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let image = msg.image.map(|image| self.media.store(image)).transpose()?;

        let changes = RecipeChanges {
            name: msg.recipe.name,
            text: msg.recipe.text,
            image,
            cooking_time: msg.recipe.cooking_time,
            tags: msg.recipe.tags,
            ingredients: msg.recipe.ingredients,
        };

        update_recipe(&mut conn, msg.recipe_id, msg.auth.user_id(), &changes).inspect_err(|_| {
            if let Some(ref image) = changes.image {
                self.media.discard(image);
            }
        })
    }
}

impl Handler<DeleteRecipe> for DbExecutor {
    type Result = AppResult<()>;

    fn handle(&mut self, msg: DeleteRecipe, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let recipe = delete_recipe(&mut conn, msg.recipe_id, msg.auth.user_id())?;

        self.media.discard(&recipe.image);
        Ok(())
    }
}

impl Handler<GetRecipe> for DbExecutor {
    type Result = AppResult<RecipeResponse>;

    fn handle(&mut self, msg: GetRecipe, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let viewer = msg.auth.as_ref().map(|auth| auth.user_id());

        get_recipe(&mut conn, msg.recipe_id, viewer)
    }
}

impl Handler<GetRecipes> for DbExecutor {
    type Result = AppResult<RecipeListResponse>;

    fn handle(&mut self, msg: GetRecipes, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let viewer = msg.auth.as_ref().map(|auth| auth.user_id());
        let page = Page::new(msg.page, self.page_size);

        list_recipes(&mut conn, &msg.filter, viewer, page)
    }
}

// ================================== OPERATIONS ================================== //

pub fn create_recipe(
    conn: &mut PgConnection,
    author_id: UserId,
    draft: &RecipeDraft,
) -> AppResult<RecipeResponse> {
    check_name(&draft.name)?;
    check_composition(Some(draft.cooking_time), &draft.tags, &draft.ingredients)?;

    let recipe = conn.transaction::<_, AppError, _>(|conn| {
        ensure_tags_exist(conn, &draft.tags)?;
        ensure_ingredients_exist(conn, &draft.ingredients)?;

        let recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                author_id,
                name: draft.name.trim(),
                text: &draft.text,
                image: &draft.image,
                cooking_time: draft.cooking_time,
            })
            .get_result::<Recipe>(conn)?;

        insert_tags(conn, recipe.id, &draft.tags)?;
        insert_ingredient_lines(conn, recipe.id, &draft.ingredients)?;

        Ok(recipe)
    })?;

    info!(recipe_id = recipe.id, author_id, "recipe created");
    get_recipe_response(conn, recipe, Some(author_id))
}

/// Replaces the tag set and every ingredient line of the recipe, then applies
/// scalar changes, all in one transaction.
pub fn update_recipe(
    conn: &mut PgConnection,
    recipe_id: i32,
    editor_id: UserId,
    changes: &RecipeChanges,
) -> AppResult<RecipeResponse> {
    if let Some(ref name) = changes.name {
        check_name(name)?;
    }
    check_composition(changes.cooking_time, &changes.tags, &changes.ingredients)?;

    let recipe = conn.transaction::<_, AppError, _>(|conn| {
        let recipe = recipes::table
            .find(recipe_id)
            .for_update()
            .first::<Recipe>(conn)
            .optional()?
            .ok_or_else(|| AppError::not_found("Recipe not found"))?;

        if recipe.author_id != editor_id {
            return Err(AppError::Forbidden(
                "You are not authorized to update this recipe",
            ));
        }

        ensure_tags_exist(conn, &changes.tags)?;
        ensure_ingredients_exist(conn, &changes.ingredients)?;

        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe.id)))
            .execute(conn)?;
        diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe.id)),
        )
        .execute(conn)?;

        insert_tags(conn, recipe.id, &changes.tags)?;
        insert_ingredient_lines(conn, recipe.id, &changes.ingredients)?;

        let changeset = RecipeChangeset {
            name: changes.name.as_deref().map(str::trim),
            text: changes.text.as_deref(),
            image: changes.image.as_deref(),
            cooking_time: changes.cooking_time,
        };

        if changeset.is_empty() {
            return Ok(recipe);
        }

        diesel::update(recipes::table.find(recipe.id))
            .set(&changeset)
            .get_result::<Recipe>(conn)
            .map_err(Into::into)
    })?;

    info!(recipe_id = recipe.id, editor_id, "recipe updated");
    get_recipe_response(conn, recipe, Some(editor_id))
}

/// Deletes the recipe; lines, tags, favorites and cart entries go with it.
pub fn delete_recipe(
    conn: &mut PgConnection,
    recipe_id: i32,
    editor_id: UserId,
) -> AppResult<Recipe> {
    let recipe = find_recipe(conn, recipe_id)?;

    if recipe.author_id != editor_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this recipe",
        ));
    }

    diesel::delete(recipes::table.find(recipe.id)).execute(conn)?;

    info!(recipe_id, editor_id, "recipe deleted");
    Ok(recipe)
}

pub fn get_recipe(
    conn: &mut PgConnection,
    recipe_id: i32,
    viewer: Option<UserId>,
) -> AppResult<RecipeResponse> {
    let recipe = find_recipe(conn, recipe_id)?;
    get_recipe_response(conn, recipe, viewer)
}

/// Newest recipes first, narrowed by every active filter.
pub fn list_recipes(
    conn: &mut PgConnection,
    filter: &RecipeFilter,
    viewer: Option<UserId>,
    page: Page,
) -> AppResult<RecipeListResponse> {
    let allowed = allowed_recipe_ids(conn, filter, viewer)?;
    if matches!(allowed, Some(ref ids) if ids.is_empty()) {
        return Ok(Paginated {
            count: 0,
            results: Vec::new(),
        });
    }

    let count = recipe_query(filter.author, allowed.as_deref())
        .count()
        .get_result::<i64>(conn)?;

    let recipes = recipe_query(filter.author, allowed.as_deref())
        .order((recipes::created_at.desc(), recipes::id.desc()))
        .limit(page.size)
        .offset(page.offset())
        .load::<Recipe>(conn)?;

    Ok(Paginated {
        count,
        results: get_recipe_list_response(conn, recipes, viewer)?,
    })
}

pub(crate) fn find_recipe(conn: &mut PgConnection, recipe_id: i32) -> AppResult<Recipe> {
    recipes::table
        .find(recipe_id)
        .first::<Recipe>(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

// ================================== HELPERS ================================== //

impl RecipeChangeset<'_> {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.text.is_none()
            && self.image.is_none()
            && self.cooking_time.is_none()
    }
}

fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name", "name can't be blank"));
    }
    Ok(())
}

/// Input checks that need no storage access. Duplicated ingredients are
/// rejected rather than merged so that the submitted list is the stored list.
pub fn check_composition(
    cooking_time: Option<i32>,
    tag_ids: &[i32],
    lines: &[IngredientAmount],
) -> AppResult<()> {
    if matches!(cooking_time, Some(time) if time < 1) {
        return Err(AppError::validation(
            "cooking_time",
            "Cooking time must be at least 1 minute",
        ));
    }

    if tag_ids.is_empty() {
        return Err(AppError::validation("tags", "At least one tag is required"));
    }

    let mut seen = HashSet::with_capacity(tag_ids.len());
    if let Some(tag_id) = tag_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::validation(
            "tags",
            format!("Tag {tag_id} is listed more than once"),
        ));
    }

    if lines.is_empty() {
        return Err(AppError::validation(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !(1..=MAX_AMOUNT).contains(&line.amount) {
            return Err(AppError::validation(
                "ingredients",
                format!(
                    "Amount of ingredient {} must be between 1 and {MAX_AMOUNT}",
                    line.id
                ),
            ));
        }

        if !seen.insert(line.id) {
            return Err(AppError::validation(
                "ingredients",
                format!("Ingredient {} is listed more than once", line.id),
            ));
        }
    }

    Ok(())
}

fn ensure_tags_exist(conn: &mut PgConnection, tag_ids: &[i32]) -> AppResult<()> {
    let found: HashSet<i32> = tags::table
        .filter(tags::id.eq_any(tag_ids))
        .select(tags::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    match tag_ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::validation(
            "tags",
            format!("Tag {missing} does not exist"),
        )),
        None => Ok(()),
    }
}

fn ensure_ingredients_exist(conn: &mut PgConnection, lines: &[IngredientAmount]) -> AppResult<()> {
    let ids: Vec<i32> = lines.iter().map(|line| line.id).collect();
    let found: HashSet<i32> = ingredients::table
        .filter(ingredients::id.eq_any(&ids))
        .select(ingredients::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::validation(
            "ingredients",
            format!("Ingredient {missing} does not exist"),
        )),
        None => Ok(()),
    }
}

fn insert_tags(conn: &mut PgConnection, recipe_id: i32, tag_ids: &[i32]) -> AppResult<usize> {
    let rows: Vec<NewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();

    diesel::insert_into(recipe_tags::table)
        .values(&rows)
        .execute(conn)
        .map_err(Into::into)
}

fn insert_ingredient_lines(
    conn: &mut PgConnection,
    recipe_id: i32,
    lines: &[IngredientAmount],
) -> AppResult<usize> {
    let rows: Vec<NewRecipeIngredient> = lines
        .iter()
        .map(|line| NewRecipeIngredient {
            recipe_id,
            ingredient_id: line.id,
            amount: line.amount,
        })
        .collect();

    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)
        .map_err(Into::into)
}

/// `None` means unrestricted; `Some` is the intersection of every id-based filter.
fn allowed_recipe_ids(
    conn: &mut PgConnection,
    filter: &RecipeFilter,
    viewer: Option<UserId>,
) -> AppResult<Option<Vec<i32>>> {
    let mut allowed: Option<HashSet<i32>> = None;
    let mut restrict = |ids: Vec<i32>| {
        let ids: HashSet<i32> = ids.into_iter().collect();
        allowed = Some(match allowed.take() {
            Some(current) => current.intersection(&ids).copied().collect(),
            None => ids,
        });
    };

    if !filter.tags.is_empty() {
        restrict(
            recipe_tags::table
                .inner_join(tags::table)
                .filter(tags::slug.eq_any(&filter.tags))
                .select(recipe_tags::recipe_id)
                .load::<i32>(conn)?,
        );
    }

    if filter.is_favorited {
        restrict(match viewer {
            Some(user_id) => favorite_recipes::table
                .filter(favorite_recipes::user_id.eq(user_id))
                .select(favorite_recipes::recipe_id)
                .load::<i32>(conn)?,
            None => Vec::new(),
        });
    }

    if filter.is_in_shopping_cart {
        restrict(match viewer {
            Some(user_id) => shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .select(shopping_carts::recipe_id)
                .load::<i32>(conn)?,
            None => Vec::new(),
        });
    }

    Ok(allowed.map(|ids| ids.into_iter().collect()))
}

fn recipe_query(author: Option<UserId>, allowed: Option<&[i32]>) -> recipes::BoxedQuery<'_, Pg> {
    let mut query = recipes::table.into_boxed();

    if let Some(author_id) = author {
        query = query.filter(recipes::author_id.eq(author_id));
    }

    if let Some(ids) = allowed {
        query = query.filter(recipes::id.eq_any(ids));
    }

    query
}

fn get_recipe_response(
    conn: &mut PgConnection,
    recipe: Recipe,
    viewer: Option<UserId>,
) -> AppResult<RecipeResponse> {
    get_recipe_list_response(conn, vec![recipe], viewer)?
        .pop()
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

/// Expands recipes with tags, ingredient lines, author and the viewer-relative
/// flags, using one query per relation for the whole batch.
fn get_recipe_list_response(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
    viewer: Option<UserId>,
) -> AppResult<Vec<RecipeResponse>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i32> = recipes.iter().map(|recipe| recipe.id).collect();
    let mut author_ids: Vec<UserId> = recipes.iter().map(|recipe| recipe.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<UserId, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load::<User>(conn)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::id)
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load::<(i32, Tag)>(conn)?
    {
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }

    let mut lines_by_recipe: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    for (recipe_id, amount, ingredient) in recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(recipe_ingredients::id)
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            Ingredient::as_select(),
        ))
        .load::<(i32, i32, Ingredient)>(conn)?
    {
        lines_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientResponse::new(ingredient, amount));
    }

    let (favorited, in_cart, subscribed) = match viewer {
        Some(user_id) => get_viewer_flags(conn, user_id, &recipe_ids, &author_ids)?,
        None => Default::default(),
    };

    recipes
        .into_iter()
        .map(|recipe| {
            let author = authors
                .get(&recipe.author_id)
                .cloned()
                .ok_or_else(|| AppError::not_found("Recipe author not found"))?;

            Ok(RecipeResponse {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author: UserResponse::new(author, subscribed.contains(&recipe.author_id)),
                ingredients: lines_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            })
        })
        .collect()
}

type ViewerFlags = (HashSet<i32>, HashSet<i32>, HashSet<UserId>);

/// Favorites, cart entries and subscriptions of the viewer among the batch.
/// Computed on every read, never stored on the recipe.
fn get_viewer_flags(
    conn: &mut PgConnection,
    user_id: UserId,
    recipe_ids: &[i32],
    author_ids: &[UserId],
) -> AppResult<ViewerFlags> {
    let favorited = favorite_recipes::table
        .filter(favorite_recipes::user_id.eq(user_id))
        .filter(favorite_recipes::recipe_id.eq_any(recipe_ids))
        .select(favorite_recipes::recipe_id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    let in_cart = shopping_carts::table
        .filter(shopping_carts::user_id.eq(user_id))
        .filter(shopping_carts::recipe_id.eq_any(recipe_ids))
        .select(shopping_carts::recipe_id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    let subscribed = follows::table
        .filter(follows::user_id.eq(user_id))
        .filter(follows::author_id.eq_any(author_ids))
        .select(follows::author_id)
        .load::<UserId>(conn)?
        .into_iter()
        .collect();

    Ok((favorited, in_cart, subscribed))
}

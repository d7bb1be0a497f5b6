use serde::{Deserialize, Serialize};
use supaorm_core::{op, table, Client, CountMode, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    email: String,
    age: i32,
}

#[tokio::main]
async fn main() -> supaorm_core::Result<()> {
    // Query strings are built without a client
    let adults = table("users")
        .select(("id", "name", "email"))
        .where_("age", op::GT, 18)
        .where_("city", "like", "%York%")
        .order_desc("created_at")
        .limit(10)
        .offset(5);

    println!("GET {}", adults.build_url());

    // Grouped and negated filters, pagination through Range
    let staff = table("users")
        .or(["role.eq.admin", "role.eq.editor"])
        .not("status", "eq", "banned")
        .range(0, 24)
        .count_with(CountMode::Planned);

    println!("GET {}", staff.build_url());

    // Filter values render the way PostgREST reads them
    let ids = Value::from(vec![1, 2, 3]);
    println!(
        "in-list {} with {} ids",
        ids,
        ids.as_array().map(Vec::len).unwrap_or(0)
    );
    let missing = Value::from(None::<String>);
    if missing.is_null() {
        println!("unset values render as {}", missing);
    }

    // Live calls need SUPABASE_URL and SUPABASE_KEY
    let client = match Client::from_env() {
        Ok(client) => client,
        Err(err) => {
            println!("skipping live requests: {}", err);
            return Ok(());
        }
    };

    let (users, total): (Vec<User>, _) = client
        .from("users")
        .select("*")
        .where_("age", op::GTE, 21)
        .range(0, 9)
        .get_with_count()
        .await?;
    println!("fetched {} of {:?} users", users.len(), total);

    let mut new_user = User {
        id: None,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        age: 25,
    };
    client.from("users").insert(&mut new_user).await?;
    println!("inserted {:?}", new_user);

    if let Some(id) = new_user.id {
        new_user.age += 1;
        client
            .from("users")
            .where_("id", "eq", id)
            .update(&mut new_user)
            .await?;

        client.from("users").where_("id", "eq", id).delete().await?;
        println!("removed user {}", id);
    }

    Ok(())
}

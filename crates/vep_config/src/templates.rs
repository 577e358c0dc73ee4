//! Built-in starting points for new virtual endpoints

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const BLANK_TEMPLATE: &str = "blank";

static TEMPLATES: &[(&str, Template)] = &[
    (
        BLANK_TEMPLATE,
        Template {
            name: "Blank",
            description: "Empty endpoint returning a static payload",
            code: r"async function virtualEndpoint(context) {
  const { input } = context;

  return {
    message: 'Hello from a virtual endpoint',
    params: input.params,
    query: input.query,
  };
}",
        },
    ),
    (
        "passthrough",
        Template {
            name: "Passthrough",
            description: "Forward the request to the first real endpoint",
            code: r"async function virtualEndpoint(context) {
  const { input, meta } = context;
  const target = meta.endpoints[0];
  if (!target) {
    throw new Error('No real endpoints are available');
  }

  return context.call(target.id, {
    params: input.params,
    query: input.query,
    body: target.method === 'GET' ? undefined : input.body,
  });
}",
        },
    ),
    (
        "combine",
        Template {
            name: "Combine endpoints",
            description: "Call two endpoints in sequence and merge their responses",
            code: r"async function virtualEndpoint(context) {
  const { input, utils } = context;

  const user = await context.get('get-user', { params: { id: input.params.id } });
  const posts = await context.get('list-posts', { query: { userId: input.params.id } });

  return utils.merge(utils.pick(user, ['id', 'name', 'email']), {
    posts: utils.sortBy(posts, 'id', 'desc').slice(0, 5),
    postCount: posts.length,
  });
}",
        },
    ),
    (
        "parallel",
        Template {
            name: "Parallel requests",
            description: "Fan out to several endpoints concurrently",
            code: r"async function virtualEndpoint(context) {
  const [users, posts, comments] = await context.parallel(
    { endpointId: 'list-users' },
    { endpointId: 'list-posts' },
    { endpointId: 'list-comments', options: { query: { limit: '10' } } },
  );

  return {
    totals: {
      users: users.length,
      posts: posts.length,
      comments: comments.length,
    },
    generatedAt: new Date(context.meta.timestamp).toISOString(),
  };
}",
        },
    ),
    (
        "transform",
        Template {
            name: "Transform data",
            description: "Reshape a response with the utils library",
            code: r"async function virtualEndpoint(context) {
  const { utils } = context;
  const users = await context.get('list-users');

  const cleaned = users.map((user) =>
    utils.mapKeys(utils.omit(user, ['password', 'token']), (key) => utils.snakeCase(key)),
  );

  return {
    byCompany: utils.groupBy(cleaned, 'company.name'),
    averageAge: utils.round(utils.avg(cleaned, 'age'), 1),
  };
}",
        },
    ),
    (
        "fetch_external",
        Template {
            name: "External API",
            description: "Call an arbitrary URL with fetch",
            code: r"async function virtualEndpoint(context) {
  const { input, utils } = context;
  const url = utils.buildUrl('https://jsonplaceholder.typicode.com/todos/:id', {
    id: input.params.id || '1',
  });

  const todo = await context.fetch(url);
  return { ...todo, slug: utils.slugify(todo.title) };
}",
        },
    ),
    (
        "conditional",
        Template {
            name: "Conditional logic",
            description: "Plain statements returning different payloads per request",
            code: r"const { input, utils } = context;

if (utils.isEmpty(input.query.status)) {
  return { error: 'status query parameter is required' };
}

const items = await context.get('list-items', { query: { status: input.query.status } });
const [active, inactive] = utils.partition(items, (item) => item.active);

return { active, inactive, checkedAt: utils.formatDate(new Date(), 'YYYY-MM-DD HH:mm') };",
        },
    ),
];

/// Keys, names and descriptions of every built-in template, in catalog order
pub fn template_list() -> Vec<TemplateSummary> {
    TEMPLATES
        .iter()
        .map(|(key, t)| TemplateSummary {
            key: *key,
            name: t.name,
            description: t.description,
        })
        .collect()
}

/// Look up a template by key, falling back to the blank template for unknown keys
pub fn template(key: &str) -> Template {
    TEMPLATES
        .iter()
        .find(|(k, _)| *k == key)
        .or_else(|| TEMPLATES.iter().find(|(k, _)| *k == BLANK_TEMPLATE))
        .map(|(_, t)| *t)
        .unwrap_or(Template {
            name: "Blank",
            description: "",
            code: "return {};",
        })
}

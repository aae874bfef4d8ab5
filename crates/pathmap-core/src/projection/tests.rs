//! Compiler output and compile-then-evaluate tests

use super::*;
use crate::transfer::parse;
use pretty_assertions::assert_eq;
use serde_json::json;

fn compile(text: &str) -> String {
    parse(text).to_projection()
}

#[test]
fn test_struct_projection() {
    let projection = compile("@this.name:name@string\n@this.userId:userId@int");
    assert_eq!(projection, "{name:@this.name.@tostring,userId:@this.userId.@tonum}");
}

#[test]
fn test_struct_array_projection() {
    let projection = compile("@this.#.name:#.name@string\n@this.#.userId:#.userId@int");
    assert_eq!(
        projection,
        "{name:@this.#.name.@tostring,userId:@this.#.userId.@tonum}|@groupPlus:0"
    );

    let users = json!([{"name": "Ann", "userId": "1"}, {"name": "Bob", "userId": "2"}]);
    assert_eq!(
        get(&users, &projection).unwrap(),
        Some(json!([{"name": "Ann", "userId": 1}, {"name": "Bob", "userId": 2}]))
    );
}

#[test]
fn test_scalar_array_projection() {
    let projection = compile("@this.#:#@string");
    assert_eq!(projection, "@this.#.@tostring");
    assert_eq!(get(&json!([1, 2, 3]), &projection).unwrap(), Some(json!(["1", "2", "3"])));
}

#[test]
fn test_nested_arrays_increment_group_depth() {
    let projection = compile(
        "src.#.request.#.scene:dataSchemas.#.request.#.scene\n\
         src.#.action.url:dataSchemas.#.action.url",
    );
    assert_eq!(
        projection,
        "{dataSchemas:{request:{scene:src.#.request.#.scene}|@groupPlus:1,\
         action:{url:src.#.action.url}|@groupPlus:0}|@groupPlus:0}"
    );

    let doc = json!({"src": [
        {"request": [{"scene": "page"}, {"scene": "list"}], "action": {"url": "/a"}},
        {"request": [{"scene": "edit"}], "action": {"url": "/b"}}
    ]});
    assert_eq!(
        get(&doc, &projection).unwrap(),
        Some(json!({"dataSchemas": [
            {"request": [{"scene": "page"}, {"scene": "list"}], "action": {"url": "/a"}},
            {"request": [{"scene": "edit"}], "action": {"url": "/b"}}
        ]}))
    );
}

#[test]
fn test_rule_order_decides_field_order() {
    assert_eq!(compile("b:b\na:a"), "{b:b,a:a}");
    assert_eq!(compile("a:a\nb:b"), "{a:a,b:b}");
}

#[test]
fn test_service_document_projection() {
    let rules = "service.name@string
        service.title@string
        service.document@string
        servers.#.name@string
        servers.#.title@string
        servers.#.url@string
        servers.#.proxy@string
        servers.#.env@string
        navigates.#.route@string
        navigates.#.sort@int
        navigates.#.name@string
        navigates.#.title@string
        dataSchemas.#.parentNavRoute@string
        dataSchemas.#.scene@string
        dataSchemas.#.request.#.scene@string
        dataSchemas.#.request.#.type@string
        dataSchemas.#.request.#.title@string
        dataSchemas.#.request.#.fullname@string
        dataSchemas.#.request.#.name@string
        dataSchemas.#.request.#.primaryKey@bool
        dataSchemas.#.request.#.required@bool
        dataSchemas.#.response.#.name@string
        dataSchemas.#.response.#.primaryKey@bool
        dataSchemas.#.response.#.required@bool
        dataSchemas.#.response.#.scene@string
        dataSchemas.#.response.#.type@string
        dataSchemas.#.response.#.title@string
        dataSchemas.#.response.#.fullname@string
        dataSchemas.#.action.url@string
        dataSchemas.#.action.method@string
        dataSchemas.#.serviceName@string
        dataSchemas.#.navRote@string
        dataSchemas.#.name@string
        dataSchemas.#.description@string
        code@int
        message@string";

    let expected = concat!(
        "{service:{name:service.name.@tostring,title:service.title.@tostring,document:service.document.@tostring},",
        "servers:{name:servers.#.name.@tostring,title:servers.#.title.@tostring,url:servers.#.url.@tostring,",
        "proxy:servers.#.proxy.@tostring,env:servers.#.env.@tostring}|@groupPlus:0,",
        "navigates:{route:navigates.#.route.@tostring,sort:navigates.#.sort.@tonum,",
        "name:navigates.#.name.@tostring,title:navigates.#.title.@tostring}|@groupPlus:0,",
        "dataSchemas:{parentNavRoute:dataSchemas.#.parentNavRoute.@tostring,scene:dataSchemas.#.scene.@tostring,",
        "request:{scene:dataSchemas.#.request.#.scene.@tostring,type:dataSchemas.#.request.#.type.@tostring,",
        "title:dataSchemas.#.request.#.title.@tostring,fullname:dataSchemas.#.request.#.fullname.@tostring,",
        "name:dataSchemas.#.request.#.name.@tostring,primaryKey:dataSchemas.#.request.#.primaryKey.@tobool,",
        "required:dataSchemas.#.request.#.required.@tobool}|@groupPlus:1,",
        "response:{name:dataSchemas.#.response.#.name.@tostring,primaryKey:dataSchemas.#.response.#.primaryKey.@tobool,",
        "required:dataSchemas.#.response.#.required.@tobool,scene:dataSchemas.#.response.#.scene.@tostring,",
        "type:dataSchemas.#.response.#.type.@tostring,title:dataSchemas.#.response.#.title.@tostring,",
        "fullname:dataSchemas.#.response.#.fullname.@tostring}|@groupPlus:1,",
        "action:{url:dataSchemas.#.action.url.@tostring,method:dataSchemas.#.action.method.@tostring}|@groupPlus:0,",
        "serviceName:dataSchemas.#.serviceName.@tostring,navRote:dataSchemas.#.navRote.@tostring,",
        "name:dataSchemas.#.name.@tostring,description:dataSchemas.#.description.@tostring}|@groupPlus:0,",
        "code:code.@tonum,message:message.@tostring}"
    );

    let projection = compile(rules);
    assert_eq!(projection, expected);

    let doc = json!({
        "service": {"name": "advertise", "title": "Ads", "document": "http://document.com/ap"},
        "servers": [{"name": "dev", "title": "Dev", "url": "http://ad", "proxy": "", "env": ""}],
        "navigates": [{"name": "plan", "title": "Plans", "route": "/planList", "sort": "98"}],
        "dataSchemas": [{
            "name": "", "serviceName": "advertise", "navRote": "/creativeList",
            "parentNavRoute": "", "scene": "list", "description": "Creatives",
            "request": [{"type": "string", "title": "Index", "fullname": "index", "name": "index",
                         "primaryKey": "false", "required": "true", "scene": "page"}],
            "response": [{"type": "string", "title": "Code", "fullname": "code", "name": "code",
                          "primaryKey": "false", "required": "false", "scene": "businessStatus"}],
            "action": {"url": "/admin/v1/creative/list", "method": "POST"}
        }],
        "code": "0",
        "message": "ok"
    });
    let result = get(&doc, &projection).unwrap().unwrap();
    assert_eq!(result["code"], json!(0));
    assert_eq!(result["navigates"][0]["sort"], json!(98));
    assert_eq!(result["servers"][0]["name"], json!("dev"));
    assert_eq!(result["dataSchemas"][0]["request"][0]["required"], json!(true));
    assert_eq!(result["dataSchemas"][0]["response"][0]["primaryKey"], json!(false));
    assert_eq!(result["dataSchemas"][0]["action"]["method"], json!("POST"));
}

#[test]
fn test_projection_wrapper() {
    let projection = Projection::parse("{id:user.id.@tonum}").unwrap();
    assert_eq!(projection.to_string(), "{id:user.id.@tonum}");
    assert_eq!(
        projection.apply(&json!({"user": {"id": "7"}})).unwrap(),
        Some(json!({"id": 7}))
    );
    assert!(Projection::parse("{id:user.id").is_err());
}

#[test]
fn test_exists_helper() {
    let doc = json!({"data": {"pagination": {"index": 1}}});
    assert!(exists(&doc, "data.pagination.index").unwrap());
    assert!(!exists(&doc, "data.pagination.size").unwrap());
}
